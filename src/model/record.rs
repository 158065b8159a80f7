use crate::error::{Result, StatsError};

/// Column names of a hand-history line, in file order
pub const RAW_COLUMNS: [&str; 13] = [
    "player_name",
    "game_id",
    "num_players",
    "position_played",
    "pre_flop_actions",
    "pre_turn_actions",
    "pre_river_actions",
    "showdown_actions",
    "initial_stack",
    "pot_input_amount",
    "pot_winnings_amount",
    "card1",
    "card2",
];

/// Fewest fields a line may carry; the two card columns are only logged for shown hands
pub const MIN_RAW_FIELDS: usize = RAW_COLUMNS.len() - 2;

/// One player's participation in one hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub player_name: String,
    pub game_id: String,
    pub num_players: u32,
    pub position_played: u32,
    pub pre_flop_actions: String,
    pub pre_turn_actions: String,
    pub pre_river_actions: String,
    pub showdown_actions: String,
    pub initial_stack: i64,
    pub pot_input_amount: i64,
    pub pot_winnings_amount: i64,
    pub card1: Option<String>,
    pub card2: Option<String>,
}

impl RawRecord {
    /// Build a record from positional fields
    pub fn from_fields(fields: &[&str]) -> Result<Self> {
        if fields.len() < MIN_RAW_FIELDS || fields.len() > RAW_COLUMNS.len() {
            return Err(StatsError::InvalidRecord(format!(
                "expected {} to {} fields, found {}",
                MIN_RAW_FIELDS,
                RAW_COLUMNS.len(),
                fields.len()
            )));
        }

        Ok(RawRecord {
            player_name: fields[0].to_string(),
            game_id: fields[1].to_string(),
            num_players: parse_number(fields, 2)?,
            position_played: parse_number(fields, 3)?,
            pre_flop_actions: fields[4].to_string(),
            pre_turn_actions: fields[5].to_string(),
            pre_river_actions: fields[6].to_string(),
            showdown_actions: fields[7].to_string(),
            initial_stack: parse_number(fields, 8)?,
            pot_input_amount: parse_number(fields, 9)?,
            pot_winnings_amount: parse_number(fields, 10)?,
            card1: fields.get(11).map(|s| s.to_string()),
            card2: fields.get(12).map(|s| s.to_string()),
        })
    }

    /// A hand counts as won when any chips came back from the pot
    pub fn is_win(&self) -> bool {
        self.pot_winnings_amount > 0
    }

    /// Chips returned minus chips put in
    pub fn net(&self) -> Result<i64> {
        self.pot_winnings_amount
            .checked_sub(self.pot_input_amount)
            .ok_or_else(|| {
                StatsError::InvalidRecord(format!(
                    "net amount of {} in game {} overflows",
                    self.player_name, self.game_id
                ))
            })
    }
}

fn parse_number<T: std::str::FromStr>(fields: &[&str], idx: usize) -> Result<T> {
    fields[idx].parse().map_err(|_| {
        StatsError::InvalidRecord(format!(
            "{} is not a number: '{}'",
            RAW_COLUMNS[idx], fields[idx]
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: [&str; 13] = [
        "deadhead", "766303976", "8", "1", "Bc", "bc", "kc", "kf", "12653", "300", "0", "9s", "Ks",
    ];

    #[test]
    fn test_from_fields() {
        let record = RawRecord::from_fields(&LINE).unwrap();
        assert_eq!(record.player_name, "deadhead");
        assert_eq!(record.game_id, "766303976");
        assert_eq!(record.num_players, 8);
        assert_eq!(record.position_played, 1);
        assert_eq!(record.showdown_actions, "kf");
        assert_eq!(record.initial_stack, 12653);
        assert_eq!(record.pot_input_amount, 300);
        assert_eq!(record.card2.as_deref(), Some("Ks"));
        assert!(!record.is_win());
        assert_eq!(record.net().unwrap(), -300);
    }

    #[test]
    fn test_cards_are_optional() {
        let record = RawRecord::from_fields(&LINE[..11]).unwrap();
        assert_eq!(record.card1, None);
        assert_eq!(record.card2, None);
    }

    #[test]
    fn test_rejects_wrong_field_count() {
        assert!(RawRecord::from_fields(&LINE[..10]).is_err());

        let mut long = LINE.to_vec();
        long.push("extra");
        assert!(RawRecord::from_fields(&long).is_err());
    }

    #[test]
    fn test_rejects_non_numeric_amount() {
        let mut fields = LINE;
        fields[9] = "lots";
        let err = RawRecord::from_fields(&fields).unwrap_err();
        assert!(err.to_string().contains("pot_input_amount"));
    }

    #[test]
    fn test_net_overflow_is_invalid() {
        let mut fields = LINE;
        fields[9] = "-9223372036854775808";
        fields[10] = "1";
        let record = RawRecord::from_fields(&fields).unwrap();
        assert!(matches!(record.net(), Err(StatsError::InvalidRecord(_))));
    }
}
