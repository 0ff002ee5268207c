use crate::error::{NormalizeError, Result};
use crate::types::{Increment, TimeCategory};

/// Base clock at or above which a game counts as rapid
const RAPID_MIN_SECONDS: u32 = 600;
/// Base clock at or below which a game counts as bullet
const BULLET_MAX_SECONDS: u32 = 60;

/// Bucket a PGN `TimeControl` value into a category and increment flag.
///
/// Accepted shapes:
/// - `-` or `<seconds>/<seconds-per-move>` for correspondence (daily) play
/// - `<base>` or `<base>+<increment>` for clocked games
pub fn classify_time_control(spec: &str) -> Result<(TimeCategory, Increment)> {
    let spec = spec.trim();
    if spec == "-" || spec.contains('/') {
        return Ok((TimeCategory::Daily, Increment::NotApplicable));
    }

    let (base, increment) = match spec.split_once('+') {
        Some((base, inc)) => (base, Some(inc)),
        None => (spec, None),
    };

    let base: u32 = base
        .trim()
        .parse()
        .map_err(|_| NormalizeError::InvalidTimeControl(spec.to_string()))?;
    let increment = match increment {
        Some(inc) => inc
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| NormalizeError::InvalidTimeControl(spec.to_string()))?,
        None => None,
    };

    let category = if base >= RAPID_MIN_SECONDS {
        TimeCategory::Rapid
    } else if base > BULLET_MAX_SECONDS {
        TimeCategory::Blitz
    } else {
        TimeCategory::Bullet
    };

    let increment = match increment {
        Some(inc) if inc > 0 => Increment::Yes,
        _ => Increment::No,
    };

    Ok((category, increment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(spec: &str) -> TimeCategory {
        classify_time_control(spec).unwrap().0
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(category("60"), TimeCategory::Bullet);
        assert_eq!(category("61"), TimeCategory::Blitz);
        assert_eq!(category("599"), TimeCategory::Blitz);
        assert_eq!(category("600"), TimeCategory::Rapid);
        assert_eq!(category("30"), TimeCategory::Bullet);
        assert_eq!(category("1800+20"), TimeCategory::Rapid);
    }

    #[test]
    fn test_daily_encodings() {
        assert_eq!(
            classify_time_control("1/86400").unwrap(),
            (TimeCategory::Daily, Increment::NotApplicable)
        );
        assert_eq!(
            classify_time_control("-").unwrap(),
            (TimeCategory::Daily, Increment::NotApplicable)
        );
    }

    #[test]
    fn test_increment_flag() {
        // chess.com omits a zero increment entirely
        assert_eq!(classify_time_control("180").unwrap().1, Increment::No);
        assert_eq!(classify_time_control("180+2").unwrap().1, Increment::Yes);
        // lichess always writes the increment, possibly zero
        assert_eq!(classify_time_control("300+0").unwrap().1, Increment::No);
        assert_eq!(classify_time_control("300+3").unwrap().1, Increment::Yes);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            classify_time_control("blitz"),
            Err(NormalizeError::InvalidTimeControl(_))
        ));
        assert!(matches!(
            classify_time_control("300+x"),
            Err(NormalizeError::InvalidTimeControl(_))
        ));
        assert!(classify_time_control("").is_err());
    }
}
