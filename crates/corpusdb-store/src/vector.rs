use std::fmt::Write;

/// Encode a query vector as a pgvector text literal (`[0.1,0.2,...]`).
/// Bound as a text parameter and cast server-side with `::text::vector`.
pub fn vector_to_pg(vector: &[f32]) -> String {
    let mut out = String::with_capacity(vector.len() * 10 + 2);
    out.push('[');
    for (i, component) in vector.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{component}");
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_components_comma_separated() {
        assert_eq!(vector_to_pg(&[1.0, -0.5, 0.25]), "[1,-0.5,0.25]");
    }

    #[test]
    fn empty_vector_is_empty_brackets() {
        assert_eq!(vector_to_pg(&[]), "[]");
    }
}
