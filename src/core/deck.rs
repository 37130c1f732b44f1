//! Per-turn card hand and attack-slot stacking.
//!
//! Each human turn draws a hand of [`HAND_SIZE`] character cards (with replacement) from
//! the party. Copies of the same character can be stacked into one of [`MAX_SLOTS`] attack
//! slots. Stacking costs mana on a convex curve, see [`mana_cost`].

use crate::core::character::{Character, Party};
use rand::Rng;
use thiserror::Error;

/// Cards dealt per turn.
pub const HAND_SIZE: usize = 5;
/// Attack slots available per turn.
pub const MAX_SLOTS: usize = 3;

/// Why a stack request was refused. The hand and slots are untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// All attack slots already hold a group
    #[error("All 3 attack slots are already filled")]
    SlotsExhausted,
    /// The card position is not in the hand
    #[error("There is no card at position {}", .index + 1)]
    InvalidCard {
        /// Zero-based hand position
        index: usize,
    },
    /// Stack size outside `1..=3`
    #[error("A stack must be between 1 and 3 cards, not {amount}")]
    InvalidAmount {
        /// Requested stack size
        amount: usize,
    },
    /// The character already occupies a slot this turn
    #[error("That character is already stacked")]
    AlreadyStacked {
        /// Character already committed
        character_id: u64,
    },
    /// Not enough copies of the character in the hand
    #[error("Only {available} of {needed} copies are in your hand")]
    InsufficientCopies {
        /// Requested stack size
        needed: usize,
        /// Copies actually held
        available: usize,
    },
}

/// Mana needed to commit a stack of `copies` cards: 1, 2 or 6.
#[must_use]
pub const fn mana_cost(copies: usize) -> Option<u32> {
    match copies {
        1 => Some(1),
        2 => Some(2),
        3 => Some(6),
        _ => None,
    }
}

/// Copies of one character committed to an attack slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackedGroup {
    /// The stacked character
    pub character: Character,
    /// Hand positions of the committed copies
    pub cards: Vec<usize>,
}

impl StackedGroup {
    /// Number of copies in the group.
    #[must_use]
    pub fn copies(&self) -> usize {
        self.cards.len()
    }

    /// Mana this group costs.
    #[must_use]
    pub fn cost(&self) -> u32 {
        mana_cost(self.copies()).unwrap_or(0)
    }

    /// Damage dealt by this group: level times its mana cost.
    #[must_use]
    pub fn damage(&self) -> u32 {
        self.character.level * self.cost()
    }
}

/// A hand of cards plus its attack slots.
#[derive(Debug, Clone)]
pub struct Deck {
    hand: Vec<Character>,
    slots: [Option<StackedGroup>; MAX_SLOTS],
}

impl Deck {
    /// Deals a fresh hand from the party.
    pub fn new<R: Rng>(party: &Party, rng: &mut R) -> Self {
        let members = party.characters();
        let hand = (0..HAND_SIZE)
            .map(|_| members[rng.random_range(0..members.len())].clone())
            .collect();
        Self::from_hand(hand)
    }

    /// Wraps an already dealt hand.
    #[must_use]
    pub fn from_hand(hand: Vec<Character>) -> Self {
        Self {
            hand,
            slots: Default::default(),
        }
    }

    /// The dealt cards in hand order.
    #[must_use]
    pub fn hand(&self) -> &[Character] {
        &self.hand
    }

    /// Committed groups in slot order.
    pub fn stacks(&self) -> impl Iterator<Item = &StackedGroup> {
        self.slots.iter().flatten()
    }

    /// Number of filled attack slots.
    #[must_use]
    pub fn filled_slots(&self) -> usize {
        self.stacks().count()
    }

    /// Commits `amount` copies of the card at `card_index` to the first free slot.
    ///
    /// The chosen card is always part of the group; further copies are taken in hand order.
    pub fn stack(&mut self, card_index: usize, amount: usize) -> Result<StackedGroup, StackError> {
        let Some(free_slot) = self.slots.iter().position(Option::is_none) else {
            return Err(StackError::SlotsExhausted);
        };
        let character = self
            .hand
            .get(card_index)
            .ok_or(StackError::InvalidCard { index: card_index })?;
        if mana_cost(amount).is_none() {
            return Err(StackError::InvalidAmount { amount });
        }
        if self.stacks().any(|g| g.character.id == character.id) {
            return Err(StackError::AlreadyStacked {
                character_id: character.id,
            });
        }

        let copies: Vec<usize> = std::iter::once(card_index)
            .chain(
                self.hand
                    .iter()
                    .enumerate()
                    .filter(|&(i, c)| i != card_index && c.id == character.id)
                    .map(|(i, _)| i),
            )
            .collect();
        if copies.len() < amount {
            return Err(StackError::InsufficientCopies {
                needed: amount,
                available: copies.len(),
            });
        }

        let mut cards: Vec<usize> = copies.into_iter().take(amount).collect();
        cards.sort_unstable();
        let group = StackedGroup {
            character: character.clone(),
            cards,
        };
        self.slots[free_slot] = Some(group.clone());
        Ok(group)
    }

    /// Total damage of every committed group.
    #[must_use]
    pub fn attack_damage(&self) -> u32 {
        self.stacks().map(StackedGroup::damage).sum()
    }

    /// Mana committed so far.
    #[must_use]
    pub fn committed_mana(&self) -> u32 {
        self.stacks().map(StackedGroup::cost).sum()
    }

    fn group_for(&self, card_index: usize) -> Option<&StackedGroup> {
        self.stacks().find(|g| g.cards.contains(&card_index))
    }

    /// Lists the hand, one line per position.
    ///
    /// A stacked group is listed once, at its first card, with its copy count; the other
    /// committed positions are folded into that line.
    #[must_use]
    pub fn render(&self) -> String {
        self.hand
            .iter()
            .enumerate()
            .filter_map(|(index, card)| match self.group_for(index) {
                Some(group) if group.cards.first() == Some(&index) => Some(format!(
                    "`{}` **{}** · stacked x{}\n",
                    index + 1,
                    card,
                    group.copies()
                )),
                Some(_) => None,
                None => Some(format!("`{}` {}\n", index + 1, card)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::sample_characters;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn hand(ids: &[u64]) -> Vec<Character> {
        let roster = sample_characters();
        ids.iter()
            .map(|id| roster.iter().find(|c| c.id == *id).unwrap().clone())
            .collect()
    }

    #[test]
    fn test_mana_cost_curve() {
        assert_eq!(mana_cost(0), None);
        assert_eq!(mana_cost(1), Some(1));
        assert_eq!(mana_cost(2), Some(2));
        assert_eq!(mana_cost(3), Some(6));
        assert_eq!(mana_cost(4), None);
    }

    #[test]
    fn test_new_deals_five_party_cards() {
        let party = Party::new(sample_characters()).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let deck = Deck::new(&party, &mut rng);
        assert_eq!(deck.hand().len(), HAND_SIZE);
        assert!(deck.hand().iter().all(|c| party.characters().contains(c)));
        assert_eq!(deck.filled_slots(), 0);
    }

    #[test]
    fn test_stack_groups_matching_copies() {
        let mut deck = Deck::from_hand(hand(&[1, 2, 1, 3, 1]));
        let group = deck.stack(2, 2).unwrap();
        assert_eq!(group.character.id, 1);
        assert_eq!(group.cards, vec![0, 2]);
        assert_eq!(deck.filled_slots(), 1);
    }

    #[test]
    fn test_fourth_stack_exhausts_slots() {
        let mut deck = Deck::from_hand(hand(&[1, 2, 3, 4, 4]));
        deck.stack(0, 1).unwrap();
        deck.stack(1, 1).unwrap();
        deck.stack(2, 1).unwrap();

        let before = deck.hand().to_vec();
        assert_eq!(deck.stack(3, 1), Err(StackError::SlotsExhausted));
        assert_eq!(deck.hand(), before.as_slice());
        assert_eq!(deck.filled_slots(), 3);
    }

    #[test]
    fn test_insufficient_copies_is_a_no_op() {
        let mut deck = Deck::from_hand(hand(&[1, 2, 3, 1, 4]));
        let result = deck.stack(0, 3);
        assert_eq!(
            result,
            Err(StackError::InsufficientCopies {
                needed: 3,
                available: 2
            })
        );
        assert_eq!(deck.filled_slots(), 0);
    }

    #[test]
    fn test_character_occupies_one_slot() {
        let mut deck = Deck::from_hand(hand(&[1, 1, 1, 2, 3]));
        deck.stack(0, 2).unwrap();
        assert_eq!(
            deck.stack(2, 1),
            Err(StackError::AlreadyStacked { character_id: 1 })
        );
    }

    #[test]
    fn test_invalid_card_and_amount() {
        let mut deck = Deck::from_hand(hand(&[1, 2, 3, 4, 1]));
        assert_eq!(deck.stack(5, 1), Err(StackError::InvalidCard { index: 5 }));
        assert_eq!(deck.stack(0, 0), Err(StackError::InvalidAmount { amount: 0 }));
        assert_eq!(deck.stack(0, 4), Err(StackError::InvalidAmount { amount: 4 }));
    }

    #[test]
    fn test_attack_damage_follows_cost_curve() {
        let mut deck = Deck::from_hand(hand(&[1, 1, 1, 2, 3]));
        deck.stack(0, 3).unwrap();
        deck.stack(3, 1).unwrap();
        let level_1 = deck.hand()[0].level;
        let level_2 = deck.hand()[3].level;
        assert_eq!(deck.attack_damage(), level_1 * 6 + level_2);
        assert_eq!(deck.committed_mana(), 7);
    }

    #[test]
    fn test_unstacked_hand_deals_no_damage() {
        let deck = Deck::from_hand(hand(&[1, 2, 3, 4, 1]));
        assert_eq!(deck.attack_damage(), 0);
        assert_eq!(deck.committed_mana(), 0);
    }

    #[test]
    fn test_render_folds_stacked_copies() {
        let mut deck = Deck::from_hand(hand(&[1, 2, 1, 3, 2]));
        deck.stack(0, 2).unwrap();
        let text = deck.render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("`1`"));
        assert!(lines[0].contains("stacked x2"));
        assert!(lines.iter().all(|l| !l.starts_with("`3`")));
        assert!(lines[1].starts_with("`2`"));
        assert!(!lines[1].contains("stacked"));
    }
}
