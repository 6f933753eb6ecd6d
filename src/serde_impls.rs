use crate::deep_hash_set::DeepHashSet;
use crate::provider::{EqualityProvider, HashProvider};
use core::{fmt, marker::PhantomData};
use serde::{
    de::{SeqAccess, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

/// A `DeepHashSet` serializes to the list of its values in traversal order.
impl<T, H, E> Serialize for DeepHashSet<T, H, E>
where
    T: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Deserializes a list of values with default providers. Deep-equal
/// duplicates in the input collapse to their first occurrence.
impl<'de, T, H, E> Deserialize<'de> for DeepHashSet<T, H, E>
where
    T: Deserialize<'de>,
    H: HashProvider<T> + Default,
    E: EqualityProvider<T> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(SeqVisitor {
            _marker: PhantomData,
        })
    }
}

struct SeqVisitor<T, H, E> {
    _marker: PhantomData<fn() -> DeepHashSet<T, H, E>>,
}

impl<'de, T, H, E> Visitor<'de> for SeqVisitor<T, H, E>
where
    T: Deserialize<'de>,
    H: HashProvider<T> + Default,
    E: EqualityProvider<T> + Default,
{
    type Value = DeepHashSet<T, H, E>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence of set values")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        // Cap the preallocation; size hints from untrusted input can be huge.
        let capacity = seq.size_hint().unwrap_or(0).min(4096);
        let mut set =
            DeepHashSet::with_capacity_and_providers(capacity, H::default(), E::default());
        while let Some(value) = seq.next_element()? {
            set.insert(value);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use crate::DeepHashSet;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Hash, PartialEq, Serialize, Deserialize)]
    struct Record {
        n: i64,
        s: String,
        b: bool,
    }

    /// Invariant: serialization emits values in traversal order.
    #[test]
    fn serializes_as_sequence() {
        let set: DeepHashSet<i32> = [3, 1, 2].into();
        assert_eq!(serde_json::to_string(&set).unwrap(), "[3,1,2]");
    }

    /// Invariant: deserialization collapses deep-equal duplicates.
    #[test]
    fn deserialize_collapses_duplicates() {
        let json = r#"[{"n":1,"s":"1","b":true},{"n":1,"s":"1","b":true},{"n":2,"s":"2","b":false}]"#;
        let set: DeepHashSet<Record> = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Record {
            n: 2,
            s: "2".to_string(),
            b: false,
        }));
    }

    #[test]
    fn rejects_non_sequence() {
        let res: Result<DeepHashSet<i32>, _> = serde_json::from_str(r#"{"a":1}"#);
        assert!(res.is_err());
    }
}
