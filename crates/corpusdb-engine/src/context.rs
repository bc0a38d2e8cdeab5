//! Bounded prompt-context formatting.
//!
//! The engine never truncates result text; callers that feed results into
//! an LLM prompt bound the context here. Both caps are measured in
//! characters, not bytes — the corpora are largely Cyrillic.

use serde_json::Value;

use corpusdb_core::types::SearchResult;

const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder {
    /// Character cap per result text; longer texts get the marker.
    pub max_item_chars: usize,
    /// Character cap over all formatted entries combined.
    pub max_total_chars: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self { max_item_chars: 2000, max_total_chars: 15000 }
    }
}

impl ContextBuilder {
    /// Format results into numbered entries separated by `---`, stopping
    /// before the entry that would push the total past the cap.
    pub fn build(&self, results: &[SearchResult]) -> String {
        let mut total = 0usize;
        let mut entries: Vec<String> = Vec::new();

        for result in results {
            let entry = self.format_entry(entries.len() + 1, result);
            let entry_chars = entry.chars().count();
            if total + entry_chars > self.max_total_chars {
                tracing::debug!(
                    kept = entries.len(),
                    dropped = results.len() - entries.len(),
                    "Context size cap reached"
                );
                break;
            }
            total += entry_chars;
            entries.push(entry);
        }

        entries.join("\n---\n")
    }

    fn format_entry(&self, index: usize, result: &SearchResult) -> String {
        let mut entry = format!("[{index}] {}\n", result.title);

        let doc_type = metadata_str(result, "docType");
        let doc_number = metadata_str(result, "docNumber");
        if doc_type.is_some() || doc_number.is_some() {
            entry.push_str(&format!(
                "Тип: {} | Номер: {}\n",
                doc_type.unwrap_or("Не указано"),
                doc_number.unwrap_or("Не указано"),
            ));
        }

        entry.push_str(&format!(
            "Релевантность: {:.1}%\nТекст: {}\n",
            result.similarity * 100.0,
            truncate_chars(&result.text, self.max_item_chars),
        ));

        if let Some(url) = metadata_str(result, "sourceUrl") {
            entry.push_str(&format!("Источник: {url}\n"));
        }

        entry
    }
}

fn metadata_str<'a>(result: &'a SearchResult, key: &str) -> Option<&'a str> {
    result.metadata.get(key).and_then(Value::as_str)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_index]),
        None => text.to_string(),
    }
}
