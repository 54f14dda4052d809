use super::usage::UsageGraph;
use super::Rewrite;
use crate::document::SwaggerDocument;
use tracing::debug;

/// Drops definitions no path operation can reach.
///
/// Repeats until nothing more is removed, so running it again is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveUnused;

impl Rewrite for RemoveUnused {
    fn name(&self) -> &'static str {
        "remove-unused"
    }

    fn apply(&self, doc: &mut SwaggerDocument) {
        loop {
            let unused = UsageGraph::build(doc).unused();
            if unused.is_empty() {
                break;
            }
            for name in &unused {
                doc.definitions.remove(name);
            }
            debug!(removed = unused.len(), "unused definitions removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Schema;
    use crate::postprocess::fixtures::*;

    #[test]
    fn test_prunes_chains_and_is_idempotent() {
        let mut doc = doc_rooted_at(&["a.Root"]);
        doc.definitions.insert("a.Root".to_string(), simple(&[("x", string())]));
        doc.definitions.insert(
            "a.Dead".to_string(),
            simple(&[("next", Schema::reference_to("a.AlsoDead"))]),
        );
        doc.definitions.insert("a.AlsoDead".to_string(), simple(&[]));

        RemoveUnused.apply(&mut doc);
        let once = doc.clone();
        assert_eq!(doc.definitions.keys().collect::<Vec<_>>(), vec!["a.Root"]);
        RemoveUnused.apply(&mut doc);
        assert_eq!(doc, once);
    }
}
