//! In-process PDF merging with lopdf.

use super::Joiner;
use crate::error::{Error, Result};
use crate::render::ExportMode;
use lopdf::{dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};

/// Merges PDF pages without any external tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfJoiner;

impl LopdfJoiner {
    /// Merge the pages of every input document, in order, into one document.
    pub fn merge(&self, pages: &[PathBuf]) -> Result<Document> {
        if pages.is_empty() {
            return Err(Error::join(self.name(), "no pages to merge"));
        }

        let mut merged = Document::with_version("1.5");
        let mut page_ids: Vec<ObjectId> = Vec::new();
        let mut next_id = 1;

        for path in pages {
            let mut doc = Document::load(path)?;
            doc.renumber_objects_with(next_id);
            next_id = doc.max_id + 1;

            page_ids.extend(doc.get_pages().into_values());
            merged.objects.extend(doc.objects);
        }

        merged.max_id = next_id - 1;
        let pages_id = merged.new_object_id();

        for id in &page_ids {
            if let Ok(page) = merged.get_object_mut(*id).and_then(Object::as_dict_mut) {
                page.set("Parent", pages_id);
            }
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let count = kids.len() as i64;
        merged.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = merged.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        merged.trailer.set("Root", catalog_id);

        // Drop the source catalogs and page trees.
        merged.prune_objects();
        merged.renumber_objects();
        merged.compress();

        Ok(merged)
    }
}

impl Joiner for LopdfJoiner {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn supports(&self, mode: ExportMode) -> bool {
        mode == ExportMode::Pdf
    }

    fn is_available(&self) -> bool {
        true
    }

    fn join(&self, pages: &[PathBuf], output: &Path) -> Result<()> {
        let mut merged = self.merge(pages)?;
        merged
            .save(output)
            .map_err(|e| Error::join(self.name(), format!("writing {}: {}", output.display(), e)))?;
        Ok(())
    }
}
