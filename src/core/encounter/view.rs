//! Everything an encounter shows the user, and its plain-text rendering.

use super::turn::Side;
use crate::core::{
    deck::{Deck, StackedGroup},
    monsters::Monster,
};

/// Footer shown under the quest board.
pub const QUEST_FOOTER: &str = "Limited to 4 encounters per 12 hours.";

/// Message shown when a battle times out after the quest was accepted.
pub const EXPIRED_MESSAGE: &str =
    "📛 This battle has expired! This is counted as failing to complete the quest.";

/// One piece of encounter output, handed to the channel to present.
#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    /// The quest board
    QuestMenu {
        /// Guild command prefix
        prefix: &'a str,
        /// Offered monsters, in board order
        quests: &'a [Monster],
    },
    /// Prompt for the initiative roll
    RollInitiative {
        /// Guild command prefix
        prefix: &'a str,
    },
    /// A roll that could not be parsed
    InvalidRoll {
        /// Guild command prefix
        prefix: &'a str,
        /// What the user typed
        expression: &'a str,
    },
    /// Both initiatives and who opens
    Initiative {
        /// The monster's fixed initiative
        monster: u32,
        /// The user's roll
        user: u32,
        /// Who takes the first turn
        first: Side,
    },
    /// The user's hand at the start of their turn
    Hand {
        /// Guild command prefix
        prefix: &'a str,
        /// Dealt cards
        deck: &'a Deck,
        /// Mana available this turn
        mana: u32,
        /// Party hit points left
        party_hp: u32,
        /// The opponent
        monster: &'a Monster,
        /// Opponent hit points left
        monster_hp: u32,
    },
    /// A successful stack
    Stacked {
        /// The committed group
        group: &'a StackedGroup,
        /// Mana still available this turn
        mana_left: u32,
    },
    /// The user's attack
    Attack {
        /// Damage dealt
        damage: u32,
        /// The opponent
        monster: &'a Monster,
        /// Opponent hit points left
        monster_hp: u32,
    },
    /// The monster's attack
    MonsterAttack {
        /// The attacker
        monster: &'a Monster,
        /// Damage dealt
        damage: u32,
        /// Party hit points left
        party_hp: u32,
    },
    /// The monster was defeated
    Victory {
        /// The defeated monster
        monster: &'a Monster,
    },
    /// The party was defeated
    Defeat {
        /// The winning monster
        monster: &'a Monster,
    },
    /// The battle timed out
    Expired,
}

/// Renders a view as chat-ready markdown.
#[must_use]
pub fn render_text(view: &View<'_>) -> String {
    match *view {
        View::QuestMenu { prefix, quests } => {
            let board: String = quests
                .iter()
                .enumerate()
                .map(|(i, monster)| format!("**{}) - {}**\n", i + 1, monster.format_name()))
                .collect();
            format!(
                "**Monster Quests!**\nWhich quest do you choose? Do `{prefix}accept <quest number>`\n\n\
                 {board}\n_{QUEST_FOOTER}_"
            )
        }
        View::RollInitiative { prefix } => format!("**Roll initiative! Do:** `{prefix}roll 1d20`"),
        View::InvalidRoll { prefix, expression } => format!(
            "`{expression}` isn't a dice roll I understand. Try `{prefix}roll 1d20`."
        ),
        View::Initiative {
            monster,
            user,
            first,
        } => {
            let opener = match first {
                Side::Monster => "it goes first!",
                Side::Human => "you go first!",
            };
            format!("**The monster rolled a {monster}, you rolled a {user}.** **{opener}**")
        }
        View::Hand {
            prefix,
            deck,
            mana,
            party_hp,
            monster,
            monster_hp,
        } => format!(
            "**Your turn!** {} has **{monster_hp}** HP, your party has **{party_hp}** HP.\n\
             Mana: **{mana}** (stacks cost 1 / 2 / 6)\n\n{}\n\
             Do `{prefix}stack <card#> <amount>` to stack cards, then `{prefix}attack`.",
            monster.name,
            deck.render()
        ),
        View::Stacked { group, mana_left } => format!(
            "Stacked **{}** x{} for {} mana. Mana left: **{mana_left}**",
            group.character.name,
            group.copies(),
            group.cost()
        ),
        View::Attack {
            damage,
            monster,
            monster_hp,
        } => format!(
            "⚔️ You hit {} for **{damage}** damage! It has **{monster_hp}** HP left.",
            monster.name
        ),
        View::MonsterAttack {
            monster,
            damage,
            party_hp,
        } => format!(
            "🩸 {} hits your party for **{damage}** damage! Your party has **{party_hp}** HP left.",
            monster.name
        ),
        View::Victory { monster } => {
            format!("🏆 **{} has been defeated! Quest complete.**", monster.name)
        }
        View::Defeat { monster } => {
            format!("💀 **Your party was wiped out by {}. Quest failed.**", monster.name)
        }
        View::Expired => EXPIRED_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::dice::DiceExpr;
    use crate::test_utils::sample_characters;

    fn goblin() -> Monster {
        Monster {
            name: "Goblin".to_string(),
            challenge_rating: 1,
            hit_points: 12,
            initiative: 8,
            damage: DiceExpr { count: 1, sides: 6 },
        }
    }

    #[test]
    fn test_quest_menu_lists_numbered_quests() {
        let quests = vec![goblin(), goblin()];
        let text = render_text(&View::QuestMenu {
            prefix: "?",
            quests: &quests,
        });
        assert!(text.contains("`?accept <quest number>`"));
        assert!(text.contains("**1) - Goblin (CR 1)**"));
        assert!(text.contains("**2) - Goblin (CR 1)**\n\n_"));
        assert!(text.ends_with(&format!("_{QUEST_FOOTER}_")));
    }

    #[test]
    fn test_initiative_announces_opener() {
        let text = render_text(&View::Initiative {
            monster: 10,
            user: 15,
            first: Side::Human,
        });
        assert!(text.contains("monster rolled a 10, you rolled a 15"));
        assert!(text.contains("you go first"));
    }

    #[test]
    fn test_hand_includes_cards_and_mana() {
        let deck = Deck::from_hand(sample_characters().into_iter().take(5).collect());
        let monster = goblin();
        let text = render_text(&View::Hand {
            prefix: "!",
            deck: &deck,
            mana: 6,
            party_hp: 40,
            monster: &monster,
            monster_hp: 12,
        });
        assert!(text.contains("Mana: **6**"));
        assert!(text.contains("`1`"));
        assert!(text.contains("`!attack`"));
    }

    #[test]
    fn test_expired_message() {
        assert_eq!(render_text(&View::Expired), EXPIRED_MESSAGE);
    }
}
