//! Таблица с порядком вставки и семантикой таблиц хоста.
//!
//! Ключи — произвольные значения кроме `Nil`; присваивание `Nil` удаляет
//! запись. Сравнение двух таблиц не зависит от порядка записей.

use std::{
    collections::{hash_map::RandomState, HashMap},
    fmt,
    hash::{BuildHasher, Hash, Hasher},
    mem,
};

use ordered_float::OrderedFloat;

use super::Value;

/// Размер, после которого поиск ключа идёт через хеш-индекс.
const INDEX_THRESHOLD: usize = 32;

#[derive(Clone, Default)]
pub struct Table {
    entries: Vec<(Value, Value)>,
    index: Option<KeyIndex>,
    /// Наибольшее `n`, для которого заняты все ключи `1..=n`.
    border: usize,
}

/// Хеш ключа -> позиции записей с этим хешем.
#[derive(Clone, Default)]
struct KeyIndex {
    state: RandomState,
    slots: HashMap<u64, Vec<usize>>,
}

/// Хеш, согласованный с `PartialEq` для `Value`.
///
/// Составные значения и таблицы хешируются только по варианту.
fn hash_key<H: Hasher>(
    key: &Value,
    state: &mut H,
) {
    mem::discriminant(key).hash(state);
    match key {
        Value::Bool(b) => b.hash(state),
        Value::Number(n) => OrderedFloat(*n).hash(state),
        Value::Str(s) | Value::Opaque(s) => s.hash(state),
        Value::Ref(r) => r.hash(state),
        _ => {}
    }
}

/// Позиция в последовательной части, если ключ — целое число от 1.
fn sequence_slot(key: &Value) -> Option<usize> {
    match key {
        Value::Number(n) if *n >= 1.0 && n.fract() == 0.0 && *n <= usize::MAX as f64 => {
            Some(*n as usize)
        }
        _ => None,
    }
}

impl KeyIndex {
    fn build(entries: &[(Value, Value)]) -> Self {
        let mut index = Self::default();
        for (pos, (key, _)) in entries.iter().enumerate() {
            index.add(key, pos);
        }
        index
    }

    fn hash(
        &self,
        key: &Value,
    ) -> u64 {
        let mut hasher = self.state.build_hasher();
        hash_key(key, &mut hasher);
        hasher.finish()
    }

    fn find(
        &self,
        key: &Value,
        entries: &[(Value, Value)],
    ) -> Option<usize> {
        self.slots
            .get(&self.hash(key))?
            .iter()
            .copied()
            .find(|&pos| entries[pos].0 == *key)
    }

    fn add(
        &mut self,
        key: &Value,
        pos: usize,
    ) {
        let hash = self.hash(key);
        self.slots.entry(hash).or_default().push(pos);
    }

    /// Убирает запись и сдвигает позиции всех последующих.
    fn remove(
        &mut self,
        key: &Value,
        pos: usize,
    ) {
        let hash = self.hash(key);
        if let Some(bucket) = self.slots.get_mut(&hash) {
            bucket.retain(|&p| p != pos);
            if bucket.is_empty() {
                self.slots.remove(&hash);
            }
        }
        for bucket in self.slots.values_mut() {
            for p in bucket.iter_mut().filter(|p| **p > pos) {
                *p -= 1;
            }
        }
    }
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(
        &self,
        key: &Value,
    ) -> Option<usize> {
        match &self.index {
            Some(index) => index.find(key, &self.entries),
            None => self.entries.iter().position(|(k, _)| k == key),
        }
    }

    pub fn get(
        &self,
        key: &Value,
    ) -> Option<&Value> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Поиск по строковому ключу.
    pub fn get_str(
        &self,
        key: &str,
    ) -> Option<&Value> {
        self.get(&Value::Str(key.to_string()))
    }

    /// Поиск по позиционному индексу (с единицы).
    pub fn get_index(
        &self,
        index: usize,
    ) -> Option<&Value> {
        self.get(&Value::Number(index as f64))
    }

    pub fn contains_key(
        &self,
        key: &Value,
    ) -> bool {
        self.position(key).is_some()
    }

    /// Вставляет или заменяет запись, возвращая прежнее значение.
    ///
    /// Ключи `Nil` и `NaN` игнорируются, значение `Nil` удаляет запись.
    pub fn insert(
        &mut self,
        key: impl Into<Value>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if key.is_nil() || matches!(key, Value::Number(n) if n.is_nan()) {
            return None;
        }
        if value.is_nil() {
            return self.remove(&key);
        }
        if let Some(i) = self.position(&key) {
            return Some(mem::replace(&mut self.entries[i].1, value));
        }

        let slot = sequence_slot(&key);
        if let Some(index) = &mut self.index {
            index.add(&key, self.entries.len());
        }
        self.entries.push((key, value));
        if self.index.is_none() && self.entries.len() > INDEX_THRESHOLD {
            self.index = Some(KeyIndex::build(&self.entries));
        }
        if slot == Some(self.border + 1) {
            while self.contains_key(&Value::Number((self.border + 1) as f64)) {
                self.border += 1;
            }
        }
        None
    }

    pub fn remove(
        &mut self,
        key: &Value,
    ) -> Option<Value> {
        let pos = self.position(key)?;
        if let Some(index) = &mut self.index {
            index.remove(key, pos);
        }
        let (_, value) = self.entries.remove(pos);
        if self.entries.len() < INDEX_THRESHOLD / 2 {
            self.index = None;
        }
        if let Some(slot) = sequence_slot(key) {
            self.border = self.border.min(slot - 1);
        }
        Some(value)
    }

    /// Длина последовательной части `1..=n`.
    pub fn sequence_len(&self) -> usize {
        self.border
    }

    /// Таблица является чистым массивом `1..=n`.
    pub fn is_sequence(&self) -> bool {
        self.border == self.len()
    }

    /// Добавляет значение в конец последовательной части.
    pub fn push(
        &mut self,
        value: impl Into<Value>,
    ) {
        let next = self.border + 1;
        self.insert(Value::Number(next as f64), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
        self.border = 0;
    }
}

impl fmt::Debug for Table {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(feature = "fuzz")]
impl<'a> arbitrary::Arbitrary<'a> for Table {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let entries: Vec<(Value, Value)> = u.arbitrary()?;
        Ok(entries.into_iter().collect())
    }
}

impl PartialEq for Table {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl FromIterator<(Value, Value)> for Table {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut table = Table::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

impl IntoIterator for Table {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет замену значения по существующему ключу.
    #[test]
    fn test_insert_replaces() {
        let mut t = Table::new();
        assert_eq!(t.insert("a", 1.0), None);
        assert_eq!(t.insert("a", 2.0), Some(Value::Number(1.0)));
        assert_eq!(t.len(), 1);
        assert_eq!(t.get_str("a"), Some(&Value::Number(2.0)));
    }

    /// Тест проверяет, что Nil-ключ игнорируется, а Nil-значение удаляет.
    #[test]
    fn test_nil_semantics() {
        let mut t = Table::new();
        t.insert(Value::Nil, 1.0);
        assert!(t.is_empty());

        t.insert("k", true);
        t.insert("k", Value::Nil);
        assert!(t.is_empty());
    }

    /// Тест проверяет позиционные вставки и длину последовательности.
    #[test]
    fn test_push_and_sequence() {
        let mut t = Table::new();
        t.push("x");
        t.push("y");
        assert_eq!(t.sequence_len(), 2);
        assert!(t.is_sequence());
        assert_eq!(t.get_index(2), Some(&Value::from("y")));

        t.insert("name", "z");
        assert!(!t.is_sequence());
    }

    /// Тест проверяет, что сравнение не зависит от порядка вставки.
    #[test]
    fn test_eq_ignores_order() {
        let a: Table = vec![
            (Value::from("a"), Value::from(1.0)),
            (Value::from("b"), Value::from("x")),
        ]
        .into_iter()
        .collect();
        let mut b = Table::new();
        b.insert("b", "x");
        b.insert("a", 1.0);
        assert_eq!(a, b);

        b.insert("c", false);
        assert_ne!(a, b);
    }

    /// Тест проверяет поиск, замену и удаление в таблице с индексом.
    #[test]
    fn test_indexed_lookup() {
        let mut t = Table::new();
        for i in 0..1000 {
            t.insert(format!("k{i}"), i);
        }
        assert!(t.index.is_some());
        assert_eq!(t.get_str("k999"), Some(&Value::Number(999.0)));
        assert_eq!(t.insert("k10", -1), Some(Value::Number(10.0)));
        assert_eq!(t.len(), 1000);

        for i in (0..1000).step_by(2) {
            assert!(t.remove(&Value::from(format!("k{i}"))).is_some());
        }
        assert_eq!(t.len(), 500);
        assert_eq!(t.get_str("k0"), None);
        assert_eq!(t.get_str("k11"), Some(&Value::Number(11.0)));
        assert_eq!(t.get_str("k999"), Some(&Value::Number(999.0)));
        let keys: Vec<_> = t.keys().take(2).cloned().collect();
        assert_eq!(keys, vec![Value::from("k1"), Value::from("k3")]);

        for i in (1..1000).step_by(2) {
            t.remove(&Value::from(format!("k{i}")));
        }
        assert!(t.is_empty());
        assert!(t.index.is_none());
    }

    /// Тест проверяет, что -0.0 и 0.0 — один ключ.
    #[test]
    fn test_signed_zero_key() {
        let mut t = Table::new();
        for i in 0..40 {
            t.insert(i, true);
        }
        assert_eq!(t.insert(-0.0, false), Some(Value::Bool(true)));
        assert_eq!(t.len(), 40);
    }

    /// Тест проверяет, что ключ NaN не добавляет записей.
    #[test]
    fn test_nan_key_ignored() {
        let mut t = Table::new();
        t.insert(f64::NAN, 1);
        t.insert(f64::NAN, 2);
        assert!(t.is_empty());
        assert_eq!(t.get(&Value::Number(f64::NAN)), None);
    }

    /// Тест проверяет длину последовательности при вставках не по порядку
    /// и удалениях.
    #[test]
    fn test_sequence_border() {
        let mut t = Table::new();
        t.insert(3, "c");
        t.insert(2, "b");
        assert_eq!(t.sequence_len(), 0);
        t.insert(1, "a");
        assert_eq!(t.sequence_len(), 3);
        assert!(t.is_sequence());

        t.insert(2, Value::Nil);
        assert_eq!(t.sequence_len(), 1);
        assert!(!t.is_sequence());
        t.push("x");
        assert_eq!(t.get_index(2), Some(&Value::from("x")));
        assert_eq!(t.sequence_len(), 3);

        t.insert(1.5, "half");
        assert_eq!(t.sequence_len(), 3);
        t.clear();
        assert_eq!(t.sequence_len(), 0);
    }

    /// Тест проверяет сохранение порядка вставки при обходе.
    #[test]
    fn test_iteration_order() {
        let mut t = Table::new();
        t.insert("z", 1.0);
        t.insert("a", 2.0);
        let keys: Vec<_> = t.keys().cloned().collect();
        assert_eq!(keys, vec![Value::from("z"), Value::from("a")]);
    }
}
