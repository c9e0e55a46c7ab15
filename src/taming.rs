//! Taming calculator
//!
//! ```text
//! m         = (level / 30) ^ 0.85
//! base_qty  = base_food_quantity × value(first preferred) / value(food)
//! base_time = base_taming_time  × value(first preferred) / value(food)
//! quantity  = ceil(base_qty × m)
//! time      = ceil(base_time × m / taming_speed)        minutes
//! narcotics = ceil(time / 5 × level / 30)
//! ```
//!
//! The stored base values describe a level-30 tame on the creature's first
//! preferred food, so at level 30 the multiplier is exactly 1. This is an
//! approximation, not the game's affinity model.

use serde::Serialize;

use crate::models::TamingData;

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 450;
const REFERENCE_LEVEL: f64 = 30.0;
const LEVEL_EXPONENT: f64 = 0.85;
const MINUTES_PER_NARCOTIC: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TamingError {
    #[error("Level must be between {MIN_LEVEL} and {MAX_LEVEL}, got {0}")]
    LevelOutOfRange(u32),
    #[error("Taming speed must be a positive number, got {0}")]
    InvalidSpeed(f64),
}

/// Relative food value; higher feeds faster
pub fn food_value(food: &str) -> f64 {
    let lower = food.to_lowercase();
    if lower.contains("kibble") {
        4.0
    } else if lower.contains("cooked") {
        0.6
    } else if lower.contains("mutton") {
        2.5
    } else if lower.contains("prime") {
        2.0
    } else if lower.contains("meat") {
        1.0
    } else if lower.contains("mejoberr") {
        0.9
    } else if lower.contains("crop") || lower.contains("vegetable") {
        1.5
    } else if lower.contains("berr") {
        0.5
    } else {
        1.0
    }
}

pub fn level_multiplier(level: u32) -> f64 {
    (level as f64 / REFERENCE_LEVEL).powf(LEVEL_EXPONENT)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TamingRequirements {
    pub food: String,
    pub multiplier: f64,
    /// Level-30 quantity for `food`
    pub base_quantity: u32,
    /// Level-30 minutes for `food`
    pub base_time: f64,
    pub quantity: u32,
    /// Minutes
    pub time: u32,
    pub narcotics: u32,
}

/// Requirements for taming at `level`, on `food` or the first preferred food
pub fn calculate(
    taming: &TamingData,
    level: u32,
    food: Option<&str>,
    taming_speed: f64,
) -> Result<TamingRequirements, TamingError> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        return Err(TamingError::LevelOutOfRange(level));
    }
    if !taming_speed.is_finite() || taming_speed <= 0.0 {
        return Err(TamingError::InvalidSpeed(taming_speed));
    }

    let reference_food = taming.preferred_foods.0.first().map(String::as_str).unwrap_or("Raw Meat");
    let food = food.map(str::trim).filter(|f| !f.is_empty()).unwrap_or(reference_food);
    let ratio = food_value(reference_food) / food_value(food);

    let base_quantity = (taming.base_food_quantity.max(0) as f64 * ratio).ceil();
    let base_time = taming.base_taming_time.max(0.0) * ratio;
    let multiplier = level_multiplier(level);

    let quantity = (base_quantity * multiplier).ceil();
    let time = (base_time * multiplier / taming_speed).ceil();
    let narcotics = (time / MINUTES_PER_NARCOTIC * level as f64 / REFERENCE_LEVEL).ceil();

    Ok(TamingRequirements {
        food: food.to_string(),
        multiplier,
        base_quantity: base_quantity as u32,
        base_time,
        quantity: quantity as u32,
        time: time as u32,
        narcotics: narcotics as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sqlx::types::Json;

    fn rex() -> TamingData {
        TamingData {
            id: 1,
            creature_id: 1,
            method: "knockout".into(),
            preferred_foods: Json(vec!["Kibble".into(), "Raw Mutton".into(), "Raw Prime Meat".into(), "Raw Meat".into()]),
            kibble_type: Some("Exceptional Kibble".into()),
            base_food_quantity: 27,
            base_taming_time: 148.0,
            torpor_depletion_rate: None,
            base_torpor: None,
            feeding_interval: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_multiplier_is_one_at_level_30() {
        assert_eq!(level_multiplier(30), 1.0);
        let req = calculate(&rex(), 30, None, 1.0).unwrap();
        assert_eq!(req.food, "Kibble");
        assert_eq!(req.quantity, 27);
        assert_eq!(req.time, 148);
        assert_eq!(req.narcotics, 30);
    }

    #[test]
    fn test_weaker_food_needs_more() {
        let req = calculate(&rex(), 30, Some("Raw Prime Meat"), 1.0).unwrap();
        assert_eq!(req.base_quantity, 54);
        assert_eq!(req.quantity, req.base_quantity);
    }

    #[test]
    fn test_food_value_prefers_cooked_over_meat() {
        assert_eq!(food_value("Cooked Meat"), 0.6);
        assert_eq!(food_value("Raw Meat"), 1.0);
        assert_eq!(food_value("Prime Meat"), 2.0);
        assert_eq!(food_value("Mejoberry"), 0.9);
        assert_eq!(food_value("Stone"), 1.0);
    }

    #[test]
    fn test_taming_speed_shortens_time() {
        let normal = calculate(&rex(), 150, None, 1.0).unwrap();
        let fast = calculate(&rex(), 150, None, 3.0).unwrap();
        assert!(fast.time < normal.time);
        assert_eq!(fast.quantity, normal.quantity);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(calculate(&rex(), 0, None, 1.0), Err(TamingError::LevelOutOfRange(0)));
        assert_eq!(calculate(&rex(), 451, None, 1.0), Err(TamingError::LevelOutOfRange(451)));
        assert!(matches!(calculate(&rex(), 30, None, 0.0), Err(TamingError::InvalidSpeed(_))));
    }

    proptest! {
        #[test]
        fn quantity_grows_with_level(level in MIN_LEVEL..MAX_LEVEL) {
            let low = calculate(&rex(), level, None, 1.0).unwrap();
            let high = calculate(&rex(), level + 1, None, 1.0).unwrap();
            prop_assert!(high.quantity >= low.quantity);
            prop_assert!(high.narcotics >= low.narcotics);
        }
    }
}
