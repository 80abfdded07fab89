use core::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::card::Card;

/// Очки блэкджека, при которых рука перебрала.
pub const BLACKJACK: u32 = 21;

/// Подсчёт очков руки.
///
/// Туз сначала считается за 11; пока сумма больше 21 и остаются
/// "мягкие" тузы, каждый такой туз понижается на 10.
/// Например, {A, A, 9} → 21.
pub fn score(cards: &[Card]) -> u32 {
    let mut total: u32 = cards.iter().map(Card::value).sum();
    let mut soft_aces = cards.iter().filter(|c| c.is_ace()).count();

    while total > BLACKJACK && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    total
}

pub fn is_bust(cards: &[Card]) -> bool {
    score(cards) > BLACKJACK
}

/// Натуральный блэкджек: ровно две карты и 21 очко.
pub fn has_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && score(cards) == BLACKJACK
}

/// Рука игрока или дилера.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hand {
    pub cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn clear(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn score(&self) -> u32 {
        score(&self.cards)
    }

    pub fn is_bust(&self) -> bool {
        is_bust(&self.cards)
    }

    pub fn has_blackjack(&self) -> bool {
        has_blackjack(&self.cards)
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{card}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(s: &str) -> Vec<Card> {
        s.split_whitespace().map(|c| c.parse().unwrap()).collect()
    }

    #[test]
    fn aces_are_softened_one_by_one() {
        assert_eq!(score(&cards("Ah Ad 9c")), 21);
        assert_eq!(score(&cards("Ah Ad")), 12);
        assert_eq!(score(&cards("Ah Ad Ac As")), 14);
        assert_eq!(score(&cards("Ah Kd")), 21);
        assert_eq!(score(&cards("Ah 9d 5c")), 15);
    }

    #[test]
    fn bust_and_blackjack_detection() {
        assert!(is_bust(&cards("Kh Qd 2c")));
        assert!(!is_bust(&cards("Kh Ad")));
        assert!(has_blackjack(&cards("Ah Jd")));
        assert!(!has_blackjack(&cards("7h 7d 7c")));
    }

    #[test]
    fn empty_hand_scores_zero() {
        assert_eq!(Hand::new().score(), 0);
    }
}
