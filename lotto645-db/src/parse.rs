//! Parseur strict d'une ligne de tirage : `tour, n1..n6, bonus`.
//!
//! Aucune tolérance ici : exactement 8 champs entiers, tirage valide.
//! Les normalisations propres au fichier CSV vivent dans `csv_store`.

use crate::error::HistoryError;
use crate::models::{Draw, PICK_COUNT};

pub const FIELD_COUNT: usize = 1 + PICK_COUNT + 1;

pub fn parse_draw_fields<S: AsRef<str>>(fields: &[S], line: u64) -> Result<Draw, HistoryError> {
    if fields.len() != FIELD_COUNT {
        return Err(HistoryError::malformed(
            line,
            format!("{} champs attendus, {} reçus", FIELD_COUNT, fields.len()),
        ));
    }

    let round: u32 = parse_field(fields[0].as_ref(), 0, line)?;

    let mut numbers = [0u8; PICK_COUNT];
    for (i, slot) in numbers.iter_mut().enumerate() {
        *slot = parse_field(fields[i + 1].as_ref(), i + 1, line)?;
    }
    let bonus: u8 = parse_field(fields[FIELD_COUNT - 1].as_ref(), FIELD_COUNT - 1, line)?;

    Draw::new(round, numbers, bonus).map_err(|e| HistoryError::malformed(line, e.to_string()))
}

fn parse_field<T: std::str::FromStr>(raw: &str, idx: usize, line: u64) -> Result<T, HistoryError> {
    raw.parse::<T>().map_err(|_| {
        HistoryError::malformed(line, format!("impossible de parser '{}' (index {})", raw, idx))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_row() {
        let draw = parse_draw_fields(&["1101", "6", "7", "13", "28", "36", "42", "12"], 2).unwrap();
        assert_eq!(draw.round, 1101);
        assert_eq!(draw.numbers, [6, 7, 13, 28, 36, 42]);
        assert_eq!(draw.bonus, 12);
    }

    #[test]
    fn test_parse_sorts_numbers() {
        let draw = parse_draw_fields(&["3", "42", "7", "13", "6", "36", "28", "12"], 1).unwrap();
        assert_eq!(draw.numbers, [6, 7, 13, 28, 36, 42]);
    }

    #[test]
    fn test_parse_missing_column() {
        let err = parse_draw_fields(&["1101", "6", "7", "13", "28", "36", "42"], 4).unwrap_err();
        assert!(matches!(err, HistoryError::DataMalformed { line: 4, .. }));
    }

    #[test]
    fn test_parse_non_integer() {
        let err = parse_draw_fields(&["1,101", "6", "7", "13", "28", "36", "42", "12"], 3).unwrap_err();
        assert!(matches!(err, HistoryError::DataMalformed { line: 3, .. }));
        let err = parse_draw_fields(&["1101", "6", "x", "13", "28", "36", "42", "12"], 3).unwrap_err();
        assert!(matches!(err, HistoryError::DataMalformed { line: 3, .. }));
    }

    #[test]
    fn test_parse_invalid_draw_is_malformed() {
        let err = parse_draw_fields(&["9", "6", "6", "13", "28", "36", "42", "12"], 7).unwrap_err();
        match err {
            HistoryError::DataMalformed { line, reason } => {
                assert_eq!(line, 7);
                assert!(reason.contains("double"), "{reason}");
            }
            other => panic!("erreur inattendue : {other:?}"),
        }
    }
}
