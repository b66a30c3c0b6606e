use chrono::{DateTime, SecondsFormat, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub fn to_rfc3339_millis(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
pub mod test {
    use std::cell::Cell;

    use chrono::{DateTime, TimeZone, Utc};

    use super::Clock;

    /// Returns each configured instant in turn, repeating the last one.
    pub struct StepClock {
        values: Vec<DateTime<Utc>>,
        index: Cell<usize>,
    }

    impl StepClock {
        pub fn new(millis: Vec<i64>) -> Self {
            let values = millis
                .into_iter()
                .map(|value| Utc.timestamp_millis_opt(value).unwrap())
                .collect();
            Self {
                values,
                index: Cell::new(0),
            }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            let index = self.index.get();
            self.index.set(index + 1);
            self.values[index.min(self.values.len() - 1)]
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::to_rfc3339_millis;

    #[test]
    fn formats_with_millisecond_precision_and_z_suffix() {
        let timestamp = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(to_rfc3339_millis(timestamp), "2023-11-14T22:13:20.123Z");
    }
}
