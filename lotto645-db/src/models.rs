use crate::error::HistoryError;

/// Plus grand numéro tirable (1-45).
pub const POOL_SIZE: u8 = 45;
/// Nombre de numéros gagnants par tirage (bonus exclu).
pub const PICK_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Draw {
    pub round: u32,
    /// Toujours triés par ordre croissant.
    pub numbers: [u8; PICK_COUNT],
    pub bonus: u8,
}

impl Draw {
    pub fn new(round: u32, mut numbers: [u8; PICK_COUNT], bonus: u8) -> Result<Self, HistoryError> {
        validate_draw(round, &numbers, bonus)?;
        numbers.sort_unstable();
        Ok(Self { round, numbers, bonus })
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }
}

pub fn validate_draw(round: u32, numbers: &[u8; PICK_COUNT], bonus: u8) -> Result<(), HistoryError> {
    if round == 0 {
        return Err(HistoryError::InvalidDraw("le numéro de tirage doit être positif".to_string()));
    }
    for &n in numbers {
        if !(1..=POOL_SIZE).contains(&n) {
            return Err(HistoryError::InvalidDraw(format!("numéro {} hors limites (1-{})", n, POOL_SIZE)));
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                return Err(HistoryError::InvalidDraw(format!("numéro en double : {}", numbers[i])));
            }
        }
    }
    if !(1..=POOL_SIZE).contains(&bonus) {
        return Err(HistoryError::InvalidDraw(format!("bonus {} hors limites (1-{})", bonus, POOL_SIZE)));
    }
    if numbers.contains(&bonus) {
        return Err(HistoryError::InvalidDraw(format!("le bonus {} figure déjà parmi les numéros gagnants", bonus)));
    }
    Ok(())
}

/// Historique des tirages, trié par tour croissant, sans doublon de tour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryTable {
    draws: Vec<Draw>,
}

impl HistoryTable {
    pub fn new(mut draws: Vec<Draw>) -> Result<Self, HistoryError> {
        for draw in &draws {
            validate_draw(draw.round, &draw.numbers, draw.bonus)?;
        }
        draws.sort_by_key(|d| d.round);
        if let Some(w) = draws.windows(2).find(|w| w[0].round == w[1].round) {
            return Err(HistoryError::DuplicateRound(w[0].round));
        }
        Ok(Self { draws })
    }

    /// Insère un tirage à sa place ; refuse un tour déjà présent.
    pub fn push(&mut self, draw: Draw) -> Result<(), HistoryError> {
        validate_draw(draw.round, &draw.numbers, draw.bonus)?;
        match self.draws.binary_search_by_key(&draw.round, |d| d.round) {
            Ok(_) => Err(HistoryError::DuplicateRound(draw.round)),
            Err(pos) => {
                self.draws.insert(pos, draw);
                Ok(())
            }
        }
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn last_round(&self) -> Option<u32> {
        self.draws.last().map(|d| d.round)
    }

    pub fn contains_round(&self, round: u32) -> bool {
        self.draws.binary_search_by_key(&round, |d| d.round).is_ok()
    }

    /// Les `n` tirages les plus récents, toujours en ordre chronologique.
    pub fn recent(&self, n: usize) -> &[Draw] {
        let start = self.draws.len().saturating_sub(n);
        &self.draws[start..]
    }

    pub fn winning_numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.draws.iter().flat_map(|d| d.numbers.iter().copied())
    }
}

/// Historique synthétique pour les tests : chaque tour tire 6 numéros
/// consécutifs dont l'origine tourne sur la grille.
pub fn make_test_history(n: usize) -> HistoryTable {
    let draws = (0..n)
        .map(|i| {
            let base = ((i * 7) % 39) as u8;
            let numbers = [base + 1, base + 2, base + 3, base + 4, base + 5, base + 6];
            Draw { round: (i + 1) as u32, numbers, bonus: base + 7 }
        })
        .collect();
    HistoryTable { draws }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_draw_ok() {
        assert!(validate_draw(1, &[1, 2, 3, 4, 5, 6], 7).is_ok());
        assert!(validate_draw(1000, &[45, 44, 43, 42, 41, 40], 1).is_ok());
    }

    #[test]
    fn test_validate_draw_out_of_range() {
        assert!(validate_draw(1, &[0, 2, 3, 4, 5, 6], 7).is_err());
        assert!(validate_draw(1, &[1, 2, 3, 4, 5, 46], 7).is_err());
        assert!(validate_draw(1, &[1, 2, 3, 4, 5, 6], 46).is_err());
    }

    #[test]
    fn test_validate_draw_duplicates() {
        assert!(validate_draw(1, &[1, 1, 3, 4, 5, 6], 7).is_err());
        assert!(validate_draw(1, &[1, 2, 3, 4, 5, 6], 6).is_err());
    }

    #[test]
    fn test_validate_draw_round_zero() {
        assert!(validate_draw(0, &[1, 2, 3, 4, 5, 6], 7).is_err());
    }

    #[test]
    fn test_draw_new_validates() {
        assert!(matches!(Draw::new(0, [1, 2, 3, 4, 5, 6], 7), Err(HistoryError::InvalidDraw(_))));
        assert!(matches!(Draw::new(5, [1, 2, 3, 4, 5, 46], 7), Err(HistoryError::InvalidDraw(_))));
        assert!(matches!(Draw::new(5, [1, 2, 3, 4, 5, 6], 6), Err(HistoryError::InvalidDraw(_))));
    }

    #[test]
    fn test_draw_new_sorts_numbers() {
        let draw = Draw::new(12, [40, 3, 17, 9, 28, 1], 5).unwrap();
        assert_eq!(draw.numbers, [1, 3, 9, 17, 28, 40]);
        assert!(draw.contains(17));
        assert!(!draw.contains(5));
    }

    #[test]
    fn test_history_sorted_by_round() {
        let table = HistoryTable::new(vec![
            Draw::new(3, [1, 2, 3, 4, 5, 6], 7).unwrap(),
            Draw::new(1, [7, 8, 9, 10, 11, 12], 13).unwrap(),
            Draw::new(2, [13, 14, 15, 16, 17, 18], 19).unwrap(),
        ])
        .unwrap();
        let rounds: Vec<u32> = table.draws().iter().map(|d| d.round).collect();
        assert_eq!(rounds, vec![1, 2, 3]);
        assert_eq!(table.last_round(), Some(3));
    }

    #[test]
    fn test_history_rejects_duplicate_round() {
        let result = HistoryTable::new(vec![
            Draw::new(5, [1, 2, 3, 4, 5, 6], 7).unwrap(),
            Draw::new(5, [7, 8, 9, 10, 11, 12], 13).unwrap(),
        ]);
        assert!(matches!(result, Err(HistoryError::DuplicateRound(5))));
    }

    #[test]
    fn test_history_push_keeps_order() {
        let mut table = make_test_history(3);
        table.push(Draw::new(10, [1, 2, 3, 4, 5, 6], 7).unwrap()).unwrap();
        assert_eq!(table.last_round(), Some(10));
        assert!(table.contains_round(10) && table.contains_round(2));
        assert!(!table.contains_round(4));
        let err = table.push(Draw::new(2, [1, 2, 3, 4, 5, 6], 7).unwrap());
        assert!(matches!(err, Err(HistoryError::DuplicateRound(2))));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_history_recent() {
        let table = make_test_history(10);
        let recent = table.recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].round, 8);
        assert_eq!(recent[2].round, 10);
        assert_eq!(table.recent(50).len(), 10);
    }

    #[test]
    fn test_make_test_history_valid() {
        let table = make_test_history(60);
        assert_eq!(table.len(), 60);
        for draw in table.draws() {
            assert!(validate_draw(draw.round, &draw.numbers, draw.bonus).is_ok(), "{:?}", draw);
        }
        assert_eq!(table.winning_numbers().count(), 360);
    }
}
