use serde::{Deserialize, Serialize};

use crate::domain::card::{Card, Rank, Suit};
use crate::engine::RandomSource;

/// Колода карт. Верх колоды - конец вектора (`draw` делает `pop`).
///
/// Колода принадлежит ровно одной сессии блэкджека и никогда не шарится.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    pub cards: Vec<Card>,
}

impl Deck {
    /// Стандартная 52-карточная колода в порядке:
    /// Clubs 2..A, Diamonds 2..A, Hearts 2..A, Spades 2..A.
    pub fn standard_52() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        Deck { cards }
    }

    /// Свежая перемешанная колода.
    pub fn shuffled<R: RandomSource>(rng: &mut R) -> Self {
        let mut deck = Self::standard_52();
        rng.shuffle(&mut deck.cards);
        deck
    }

    /// Колода с заранее заданным порядком (последняя карта сдаётся первой).
    /// Нужна для сценарных тестов и реплея.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Deck { cards }
    }

    /// Колода, из которой карты сдаются ровно в порядке `order`.
    pub fn stacked(order: &[Card]) -> Self {
        let mut cards = order.to_vec();
        cards.reverse();
        Deck { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Взять одну карту сверху. Пустая колода заменяется свежей
    /// перемешанной, поэтому ошибки здесь нет: играть можно бесконечно.
    pub fn draw<R: RandomSource>(&mut self, rng: &mut R) -> Card {
        if self.cards.is_empty() {
            *self = Self::shuffled(rng);
        }
        self.cards
            .pop()
            .expect("свежая колода не может быть пустой")
    }

    /// Вернуть карты в колоду и перемешать её целиком.
    pub fn return_and_shuffle<R: RandomSource>(&mut self, cards: Vec<Card>, rng: &mut R) {
        self.cards.extend(cards);
        rng.shuffle(&mut self.cards);
    }
}
