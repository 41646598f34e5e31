use crate::value::ExternalRef;

/// Побочная таблица ссылок на объекты хоста.
///
/// Тег `Instance` в потоке не несёт нагрузки: при записи ссылка
/// добавляется в конец таблицы, при чтении берётся следующая по порядку.
#[derive(Debug, Default, Clone)]
pub struct RefTable {
    refs: Vec<ExternalRef>,
    read_pos: usize,
}

impl RefTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        r: ExternalRef,
    ) {
        self.refs.push(r);
    }

    /// Следующая ссылка для чтения; `None`, если таблица исчерпана.
    pub fn next_ref(&mut self) -> Option<ExternalRef> {
        let r = self.refs.get(self.read_pos).copied();
        if r.is_some() {
            self.read_pos += 1;
        }
        r
    }

    /// Возвращает курсор чтения в начало.
    pub fn rewind_reads(&mut self) {
        self.read_pos = 0;
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn truncate(
        &mut self,
        len: usize,
    ) {
        self.refs.truncate(len);
        self.read_pos = self.read_pos.min(len);
    }

    pub fn clear(&mut self) {
        self.refs.clear();
        self.read_pos = 0;
    }

    pub fn as_slice(&self) -> &[ExternalRef] {
        &self.refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет выдачу ссылок по порядку и исчерпание.
    #[test]
    fn test_refs_in_order() {
        let mut refs = RefTable::new();
        refs.push(ExternalRef(7));
        refs.push(ExternalRef(9));

        assert_eq!(refs.next_ref(), Some(ExternalRef(7)));
        assert_eq!(refs.next_ref(), Some(ExternalRef(9)));
        assert_eq!(refs.next_ref(), None);

        refs.rewind_reads();
        assert_eq!(refs.next_ref(), Some(ExternalRef(7)));
    }

    /// Тест проверяет, что усечение не оставляет курсор за концом.
    #[test]
    fn test_truncate_clamps_read_pos() {
        let mut refs = RefTable::new();
        refs.push(ExternalRef(1));
        refs.push(ExternalRef(2));
        refs.next_ref();
        refs.next_ref();
        refs.truncate(1);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs.next_ref(), None);
        refs.clear();
        assert!(refs.is_empty());
    }
}
