use super::segment::{PathParam, PathSegment};
use super::PathDialect;

/// Renders a segment chain as a resource path relative to the data root.
pub trait PathPrinter {
    fn dialect(&self) -> PathDialect;

    /// Path addressing the node, member keys included.
    fn path(&self, segment: &PathSegment) -> String;

    /// Path addressing the collection: the last segment's own parameters
    /// are dropped and the result always ends with `/`.
    fn list_path(&self, segment: &PathSegment) -> String;
}

/// How key parameters attach to their segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamStyle {
    /// `name={a},{b}`
    Inline,
    /// `name/{a}/{b}`
    PerSegment,
}

fn segment_name(segment: &PathSegment, use_module_name: bool) -> String {
    if use_module_name {
        format!("{}:{}", segment.module(), segment.name())
    } else {
        segment.name().to_string()
    }
}

fn render_params(out: &mut String, params: &[PathParam], style: ParamStyle) {
    if params.is_empty() {
        return;
    }
    match style {
        ParamStyle::Inline => {
            let joined: Vec<String> = params.iter().map(|p| format!("{{{}}}", p.name)).collect();
            out.push('=');
            out.push_str(&joined.join(","));
        }
        ParamStyle::PerSegment => {
            for p in params {
                out.push_str("/{");
                out.push_str(&p.name);
                out.push('}');
            }
        }
    }
}

fn render(
    segment: &PathSegment,
    use_module_name: bool,
    style: ParamStyle,
    include_own_params: bool,
) -> String {
    let chain = segment.chain();
    let last = chain.len().saturating_sub(1);
    let mut out = String::new();
    for (idx, seg) in chain.into_iter().enumerate() {
        if idx > 0 {
            out.push('/');
        }
        out.push_str(&segment_name(seg, use_module_name));
        if idx < last || include_own_params {
            render_params(&mut out, seg.own_params(), style);
        }
    }
    out
}

fn with_trailing_slash(mut path: String) -> String {
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

/// RESTCONF style: `a/b={x},{y}/c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc8040Printer {
    pub use_module_name: bool,
}

impl PathPrinter for Rfc8040Printer {
    fn dialect(&self) -> PathDialect {
        PathDialect::Rfc8040
    }

    fn path(&self, segment: &PathSegment) -> String {
        render(segment, self.use_module_name, ParamStyle::Inline, true)
    }

    fn list_path(&self, segment: &PathSegment) -> String {
        with_trailing_slash(render(segment, self.use_module_name, ParamStyle::Inline, false))
    }
}

/// Bracket-per-parameter style with a trailing slash: `a/b/{x}/{y}/c/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OdlPrinter {
    pub use_module_name: bool,
}

impl PathPrinter for OdlPrinter {
    fn dialect(&self) -> PathDialect {
        PathDialect::Odl
    }

    fn path(&self, segment: &PathSegment) -> String {
        with_trailing_slash(render(
            segment,
            self.use_module_name,
            ParamStyle::PerSegment,
            true,
        ))
    }

    fn list_path(&self, segment: &PathSegment) -> String {
        with_trailing_slash(render(
            segment,
            self.use_module_name,
            ParamStyle::PerSegment,
            false,
        ))
    }
}

/// Bracket-per-parameter style without trailing slash: `a/b/{x}/{y}/c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentPrinter {
    pub use_module_name: bool,
}

impl PathPrinter for SegmentPrinter {
    fn dialect(&self) -> PathDialect {
        PathDialect::Segment
    }

    fn path(&self, segment: &PathSegment) -> String {
        render(segment, self.use_module_name, ParamStyle::PerSegment, true)
    }

    fn list_path(&self, segment: &PathSegment) -> String {
        with_trailing_slash(render(
            segment,
            self.use_module_name,
            ParamStyle::PerSegment,
            false,
        ))
    }
}
