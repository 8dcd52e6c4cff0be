//! Tables: the collections submitted for one engine run.
//!
//! A table is an ordered sequence or a key-unique mapping of elements. Anything else (a scalar, an absent value)
//! can still be expressed so that it is rejected at dispatch time with a precise diagnostic rather than refused by
//! the type system at the call site.
//!
//! Streams are drained into a sequence when the table is built.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::mpsc::Receiver;

use tabletest_core::short_type_name;

use crate::element::{AsGenerator, AsRunnable, Element, Generator, Runnable};
use crate::errors::StructuralError;

/// One table slot; `None` is a nil element.
pub type Slot = Option<Box<dyn Element>>;

/// A mapping key, classified by how it labels its element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A string key; the label is the string itself.
    Str(String),
    /// A key with a display form; the label is that form.
    Display(String),
    /// A key with no textual form; labelled `"<type> <ordinal>"`.
    Opaque(&'static str),
}

impl Key {
    pub fn display(key: impl fmt::Display) -> Self {
        Key::Display(key.to_string())
    }

    pub fn opaque<T: ?Sized>() -> Self {
        Key::Opaque(type_name::<T>())
    }

    /// The scope label for the entry at `ordinal`.
    pub fn label(&self, ordinal: usize) -> String {
        match self {
            Key::Str(s) | Key::Display(s) => s.clone(),
            Key::Opaque(ty) => format!("{} {ordinal}", short_type_name(ty)),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::Display(c.to_string())
    }
}

macro_rules! display_keys {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Key {
                fn from(k: $ty) -> Self {
                    Key::Display(k.to_string())
                }
            }
        )*
    };
}

display_keys!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool);

/// A table of elements.
pub enum Table {
    Sequence(Vec<Slot>),
    Mapping(Vec<(Key, Slot)>),
    /// A value that is neither a sequence nor a mapping, identified by its type name.
    Scalar(&'static str),
    Absent,
}

impl Table {
    /// A sequence of runnables.
    pub fn runnables<R, I>(items: I) -> Self
    where
        R: Runnable + 'static,
        I: IntoIterator<Item = R>,
    {
        Table::Sequence(
            items
                .into_iter()
                .map(|r| Some(Box::new(AsRunnable(r)) as Box<dyn Element>))
                .collect(),
        )
    }

    /// A sequence of generators.
    pub fn generators<G, I>(items: I) -> Self
    where
        G: Generator + 'static,
        I: IntoIterator<Item = G>,
    {
        Table::Sequence(
            items
                .into_iter()
                .map(|g| Some(Box::new(AsGenerator(g)) as Box<dyn Element>))
                .collect(),
        )
    }

    /// A heterogeneous sequence.
    pub fn elements<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Element>>,
    {
        Table::Sequence(items.into_iter().map(Some).collect())
    }

    /// A sequence that may contain nil elements.
    pub fn slots<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Slot>,
    {
        Table::Sequence(items.into_iter().collect())
    }

    /// A mapping of heterogeneous elements, kept in the given order.
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, Box<dyn Element>)>,
    {
        Table::Mapping(entries.into_iter().map(|(k, v)| (k.into(), Some(v))).collect())
    }

    /// A mapping of runnables, kept in the given order.
    pub fn runnable_mapping<K, R, I>(entries: I) -> Self
    where
        K: Into<Key>,
        R: Runnable + 'static,
        I: IntoIterator<Item = (K, R)>,
    {
        Table::Mapping(
            entries
                .into_iter()
                .map(|(k, r)| (k.into(), Some(Box::new(AsRunnable(r)) as Box<dyn Element>)))
                .collect(),
        )
    }

    /// A mapping that may contain nil elements.
    pub fn mapping_slots<K, I>(entries: I) -> Self
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, Slot)>,
    {
        Table::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// A non-collection value; rejected at dispatch time.
    pub fn scalar<T: ?Sized>(_value: &T) -> Self {
        Table::Scalar(type_name::<T>())
    }

    pub fn absent() -> Self {
        Table::Absent
    }

    /// Drain a stream of elements into a sequence.
    ///
    /// The stream is consumed fully before anything is validated; a stream that never ends never returns.
    pub fn drain<E, I>(stream: I) -> Self
    where
        E: Element + 'static,
        I: IntoIterator<Item = E>,
    {
        Table::Sequence(
            stream
                .into_iter()
                .map(|e| Some(Box::new(e) as Box<dyn Element>))
                .collect(),
        )
    }

    /// Drain a channel into a sequence. Blocks until every sender is dropped.
    pub fn from_receiver<E: Element + 'static>(rx: Receiver<E>) -> Self {
        Self::drain(rx)
    }

    /// Shape name used in tracing fields.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Table::Sequence(_) => "sequence",
            Table::Mapping(_) => "mapping",
            Table::Scalar(_) => "scalar",
            Table::Absent => "absent",
        }
    }

    /// Number of slots; zero for non-collections.
    pub fn len(&self) -> usize {
        match self {
            Table::Sequence(items) => items.len(),
            Table::Mapping(entries) => entries.len(),
            Table::Scalar(_) | Table::Absent => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check the table's shape before any element is dispatched.
    ///
    /// ## Returns
    /// - (`Ok(())`): a non-empty sequence, or a non-empty mapping whose keys all label distinct scopes.
    /// - (`Err(StructuralError)`): the first structural problem found.
    pub fn validate(&self) -> Result<(), StructuralError> {
        match self {
            Table::Absent => Err(StructuralError::InvalidTable),
            Table::Scalar(ty) => Err(StructuralError::NotATable {
                type_name: short_type_name(ty),
            }),
            Table::Sequence(items) if items.is_empty() => Err(StructuralError::EmptyTable),
            Table::Mapping(entries) if entries.is_empty() => Err(StructuralError::EmptyTable),
            Table::Sequence(_) => Ok(()),
            Table::Mapping(entries) => {
                // keys are compared by the scope label they produce
                let mut seen = HashSet::new();
                for (ordinal, (key, _)) in entries.iter().enumerate() {
                    let label = key.label(ordinal);
                    if seen.contains(&label) {
                        return Err(StructuralError::DuplicateKey { key: label });
                    }
                    seen.insert(label);
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Table::Sequence(items) => f.debug_tuple("Sequence").field(&items.len()).finish(),
            Table::Mapping(entries) => f
                .debug_tuple("Mapping")
                .field(&entries.iter().map(|(k, _)| k).collect::<Vec<_>>())
                .finish(),
            Table::Scalar(ty) => f.debug_tuple("Scalar").field(ty).finish(),
            Table::Absent => f.write_str("Absent"),
        }
    }
}

impl<R: Runnable + 'static> From<Vec<R>> for Table {
    fn from(items: Vec<R>) -> Self {
        Table::runnables(items)
    }
}

impl<K, R> From<HashMap<K, R>> for Table
where
    K: Into<Key>,
    R: Runnable + 'static,
{
    fn from(map: HashMap<K, R>) -> Self {
        Table::runnable_mapping(map)
    }
}

impl<K, R> From<BTreeMap<K, R>> for Table
where
    K: Into<Key>,
    R: Runnable + 'static,
{
    fn from(map: BTreeMap<K, R>) -> Self {
        Table::runnable_mapping(map)
    }
}

impl From<Option<Table>> for Table {
    fn from(table: Option<Table>) -> Self {
        table.unwrap_or(Table::Absent)
    }
}
