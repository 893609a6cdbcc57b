use crate::error::DashboardError;

/// Why an operation finished in a degraded-but-safe state.
#[derive(Debug, Clone, PartialEq)]
pub enum Degradation {
    /// The element a widget should attach to is not in the page.
    MissingTarget { id: String },
    /// A newer navigation started while this work was suspended; its result
    /// was discarded.
    Stale,
    /// No usable coordinate pair; no marker was placed.
    NoCoordinates { country: Option<String> },
    /// The primary re-centering call failed and the fallback was used.
    RecenterFallback { reason: String },
    /// Both re-centering calls failed; the marker stays placed.
    RecenterFailed { reason: String },
    /// Disposing a previous widget instance failed and was ignored.
    DisposeFailed { reason: String },
    /// The country list has no entry at this position.
    UnknownEntry { index: usize },
    /// The dataset decoded fine but holds nothing to summarize.
    EmptyDataset { resource: String },
    /// More than one of the above, in the order they happened.
    Several(Vec<Degradation>),
}

impl Degradation {
    /// Combines two reasons, flattening nested lists.
    pub fn and(self, next: Degradation) -> Degradation {
        let mut all = self.into_list();
        all.extend(next.into_list());
        Degradation::Several(all)
    }

    /// Every individual reason, in order.
    pub fn reasons(&self) -> Vec<&Degradation> {
        match self {
            Degradation::Several(all) => all.iter().flat_map(|r| r.reasons()).collect(),
            single => vec![single],
        }
    }

    fn into_list(self) -> Vec<Degradation> {
        match self {
            Degradation::Several(all) => all,
            single => vec![single],
        }
    }
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degradation::MissingTarget { id } => write!(f, "target #{id} is not in the page"),
            Degradation::Stale => write!(f, "superseded by a newer navigation"),
            Degradation::NoCoordinates { country } => write!(
                f,
                "no coordinates for {}",
                country.as_deref().unwrap_or("unnamed record")
            ),
            Degradation::RecenterFallback { reason } => {
                write!(f, "re-centered with fallback after: {reason}")
            }
            Degradation::RecenterFailed { reason } => write!(f, "could not re-center: {reason}"),
            Degradation::DisposeFailed { reason } => {
                write!(f, "ignored failure disposing previous widget: {reason}")
            }
            Degradation::UnknownEntry { index } => write!(f, "no list entry at {index}"),
            Degradation::EmptyDataset { resource } => write!(f, "{resource} has no rows"),
            Degradation::Several(all) => {
                for (i, reason) in all.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{reason}")?;
                }
                Ok(())
            }
        }
    }
}

/// Result of a best-effort dashboard operation.
///
/// `Done` succeeded. `Degraded` is safe to continue from: `value` is present
/// when the operation still produced its result. `Failed` means the
/// operation produced nothing, though the page stays usable.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Degraded {
        value: Option<T>,
        reason: Degradation,
    },
    Failed(DashboardError),
}

impl<T> Outcome<T> {
    pub fn skipped(reason: Degradation) -> Self {
        Outcome::Degraded {
            value: None,
            reason,
        }
    }

    pub fn partial(value: T, reason: Degradation) -> Self {
        Outcome::Degraded {
            value: Some(value),
            reason,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Done(v) => Some(v),
            Outcome::Degraded { value, .. } => value.as_ref(),
            Outcome::Failed(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Done(v) => Some(v),
            Outcome::Degraded { value, .. } => value,
            Outcome::Failed(_) => None,
        }
    }

    pub fn degradation(&self) -> Option<&Degradation> {
        match self {
            Outcome::Degraded { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&DashboardError> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(v) => Outcome::Done(f(v)),
            Outcome::Degraded { value, reason } => Outcome::Degraded {
                value: value.map(f),
                reason,
            },
            Outcome::Failed(e) => Outcome::Failed(e),
        }
    }

    /// Marks the result as degraded, keeping any earlier reasons. A failure
    /// stays a failure.
    pub fn degrade(self, reason: Degradation) -> Self {
        match self {
            Outcome::Done(v) => Outcome::partial(v, reason),
            Outcome::Degraded { value, reason: earlier } => Outcome::Degraded {
                value,
                reason: earlier.and(reason),
            },
            Outcome::Failed(e) => Outcome::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Degradation, Outcome};
    use crate::error::{DashboardError, MapError};

    #[test]
    fn value_is_available_for_done_and_partial() {
        assert_eq!(Outcome::Done(1).value(), Some(&1));
        assert_eq!(Outcome::partial(2, Degradation::Stale).value(), Some(&2));
        assert_eq!(Outcome::<i32>::skipped(Degradation::Stale).value(), None);
        let failed: Outcome<i32> = Outcome::Failed(DashboardError::Map(MapError::UnknownInstance));
        assert!(failed.is_failed());
        assert!(failed.value().is_none());
    }

    #[test]
    fn degrade_accumulates_reasons_in_order() {
        let out = Outcome::Done(1)
            .degrade(Degradation::Stale)
            .degrade(Degradation::UnknownEntry { index: 0 })
            .degrade(Degradation::EmptyDataset { resource: "x".into() });
        let reason = out.degradation().unwrap();
        assert_eq!(
            reason.reasons(),
            vec![
                &Degradation::Stale,
                &Degradation::UnknownEntry { index: 0 },
                &Degradation::EmptyDataset { resource: "x".into() },
            ]
        );
        assert_eq!(
            reason.to_string(),
            "superseded by a newer navigation; no list entry at 0; x has no rows"
        );
        assert_eq!(out.map(|v| v * 10).into_value(), Some(10));
    }

    #[test]
    fn single_degradation_stays_unwrapped() {
        let out = Outcome::Done(1).degrade(Degradation::Stale);
        assert_eq!(out.degradation(), Some(&Degradation::Stale));
    }

    #[test]
    fn degrade_leaves_failures_alone() {
        let failed: Outcome<i32> = Outcome::Failed(DashboardError::Map(MapError::UnknownInstance));
        assert!(failed.degrade(Degradation::Stale).is_failed());
    }
}
