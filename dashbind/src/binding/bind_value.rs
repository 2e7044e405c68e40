use crate::transport::{Value, ValueKind};

/// Maps a Rust type onto one wire kind. Implemented for every primitive the
/// dashboard understands and for arrays of them; bindings are generic over
/// this trait and otherwise share one state machine.
pub trait BindValue: Clone + 'static {
    const KIND: ValueKind;

    fn into_value(self) -> Value;

    /// `None` when `value` is a different kind
    fn from_value(value: Value) -> Option<Self>;

    fn default_value() -> Value {
        Self::KIND.default_value()
    }
}

macro_rules! impl_bind_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl BindValue for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_bind_value! {
    bool => Boolean,
    i64 => Integer,
    f32 => Float,
    f64 => Double,
    String => String,
    Vec<u8> => Raw,
    Vec<bool> => BooleanArray,
    Vec<i64> => IntegerArray,
    Vec<f32> => FloatArray,
    Vec<f64> => DoubleArray,
    Vec<String> => StringArray,
}

/// Published as a 64-bit integer; out-of-range edits are rejected.
impl BindValue for i32 {
    const KIND: ValueKind = ValueKind::Integer;

    fn into_value(self) -> Value {
        Value::Integer(self.into())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Integer(v) => i32::try_from(v).ok(),
            _ => None,
        }
    }
}
