//! String and number helpers

use rand::Rng;
use serde_json::{Map, Value};

/// Uppercase the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase every string in a list, leaving other values alone
pub fn lowercase_list(values: &mut [Value]) {
    for value in values.iter_mut() {
        if let Value::String(s) = value {
            *s = s.to_lowercase();
        }
    }
}

/// Lowercase every string value of a map (keys are untouched)
pub fn lowercase_map(values: &mut Map<String, Value>) {
    for value in values.values_mut() {
        if let Value::String(s) = value {
            *s = s.to_lowercase();
        }
    }
}

/// Lowercase a string, the strings of a list, or the string values of an object
pub fn lowercase(value: &mut Value) {
    match value {
        Value::String(s) => *s = s.to_lowercase(),
        Value::Array(values) => lowercase_list(values),
        Value::Object(values) => lowercase_map(values),
        _ => {}
    }
}

/// Whether a field value counts as set (not null, false, zero, NaN or empty)
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Inclusive range check
pub fn within_range(value: f64, min: f64, max: f64) -> bool {
    value >= min && value <= max
}

/// Log-scaled random value between `min` and `max`
///
/// Samples `exp(u * ln(max - min)) + min`, which favours the low end of the
/// range. Rounded to the nearest integer unless `float` is set.
pub fn random_between<R: Rng + ?Sized>(min: f64, max: f64, float: bool, rng: &mut R) -> f64 {
    if max - min <= 1.0 {
        return min;
    }

    let result = (rng.gen::<f64>() * (max - min).ln()).exp() + min;
    if float {
        result
    } else {
        result.round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("health"), "Health");
        assert_eq!(capitalize("Mana"), "Mana");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_lowercase_variants() {
        let mut s = json!("FIRE");
        lowercase(&mut s);
        assert_eq!(s, json!("fire"));

        let mut list = json!(["Fire", 3, "ICE"]);
        lowercase(&mut list);
        assert_eq!(list, json!(["fire", 3, "ice"]));

        let mut obj = json!({ "Name": "Potion", "cost": 5 });
        lowercase(&mut obj);
        assert_eq!(obj, json!({ "Name": "potion", "cost": 5 }));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(0.5)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn test_within_range() {
        assert!(within_range(5.0, 0.0, 10.0));
        assert!(within_range(0.0, 0.0, 10.0));
        assert!(within_range(10.0, 0.0, 10.0));
        assert!(!within_range(10.5, 0.0, 10.0));
    }

    #[test]
    fn test_random_between_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = random_between(10.0, 50.0, true, &mut rng);
            assert!(v >= 11.0 && v < 50.0, "out of range: {}", v);

            let r = random_between(10.0, 50.0, false, &mut rng);
            assert_eq!(r, r.round());
        }
    }

    #[test]
    fn test_random_between_degenerate_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(random_between(5.0, 5.0, true, &mut rng), 5.0);
        assert_eq!(random_between(9.0, 3.0, false, &mut rng), 9.0);
    }
}
