/// Combines all messages sent to a node in one superstep into a single value.
///
/// The combine function must be commutative and associative, and `identity`
/// must be neutral for it. The identity can never be NaN, which marks
/// missing messages.
#[derive(Debug, Clone, Copy)]
pub enum Reducer {
    Sum,
    Min,
    Max,
    /// Counts messages, ignoring their value.
    Count,
    Custom {
        identity: f64,
        combine: fn(f64, f64) -> f64,
    },
}

impl Reducer {
    pub fn identity(&self) -> f64 {
        match self {
            Reducer::Sum | Reducer::Count => 0.0,
            Reducer::Min => f64::MAX,
            Reducer::Max => f64::MIN,
            Reducer::Custom { identity, .. } => *identity,
        }
    }

    #[inline]
    pub fn reduce(&self, current: f64, message: f64) -> f64 {
        match self {
            Reducer::Sum => current + message,
            Reducer::Min => current.min(message),
            Reducer::Max => current.max(message),
            Reducer::Count => current + 1.0,
            Reducer::Custom { combine, .. } => combine(current, message),
        }
    }
}
