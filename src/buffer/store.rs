//! Растущее байтовое хранилище с жёстким максимумом.
//!
//! Хранилище различает выделенную ёмкость и курсор записи. Рост идёт
//! ступенчатым коэффициентом, выравнивается до 64 байт и ограничен
//! потолком [`GROWTH_CEILING`]; сверх потолка выделяется ровно
//! запрошенный объём.

use tagpack_error::BufferError;
use tracing::debug;

const MIB: usize = 1024 * 1024;
/// До этого размера ёмкость растёт в 1.5 раза.
pub const SMALL_STORE_LIMIT: usize = MIB;
/// До этого размера ёмкость растёт в 1.25 раза, дальше в 1.1.
pub const MEDIUM_STORE_LIMIT: usize = 10 * MIB;
/// Потолок ёмкости, которую даёт коэффициент роста.
pub const GROWTH_CEILING: usize = 64 * MIB;
/// Выравнивание новой ёмкости.
pub const GROWTH_ALIGN: usize = 64;

/// Снимок курсора для отката незавершённой записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreMark {
    cursor: usize,
}

impl StoreMark {
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// Новая ёмкость при росте с `current` до как минимум `required` байт.
pub fn grown_capacity(
    current: usize,
    required: usize,
) -> usize {
    if required > GROWTH_CEILING {
        return required;
    }
    let factor = if current <= SMALL_STORE_LIMIT {
        1.5
    } else if current <= MEDIUM_STORE_LIMIT {
        1.25
    } else {
        1.1
    };
    let scaled = (current as f64 * factor).floor() as usize;
    let aligned = scaled.max(required).div_ceil(GROWTH_ALIGN) * GROWTH_ALIGN;
    aligned.min(GROWTH_CEILING)
}

/// Байтовое хранилище: `[0, cursor)` занято, `[cursor, capacity)` свободно.
#[derive(Debug)]
pub struct ByteStore {
    data: Vec<u8>,
    capacity: usize,
    max_size: usize,
}

impl ByteStore {
    /// Создаёт пустое хранилище с начальной ёмкостью.
    pub fn new(
        initial_size: usize,
        max_size: usize,
    ) -> Result<Self, BufferError> {
        Ok(Self {
            data: allocate(initial_size)?,
            capacity: initial_size,
            max_size,
        })
    }

    /// Позиция записи, она же длина занятой части.
    pub fn cursor(&self) -> usize {
        self.data.len()
    }

    /// Выделенная ёмкость.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Занятая часть `[0, cursor)`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Проверяет, что после курсора поместится ещё `additional` байт,
    /// и при необходимости наращивает ёмкость.
    ///
    /// При ошибке состояние не меняется.
    pub fn ensure_capacity(
        &mut self,
        additional: usize,
    ) -> Result<(), BufferError> {
        let cursor = self.cursor();
        let end = cursor.saturating_add(additional);
        if end > self.max_size {
            return Err(BufferError::CapacityExceeded {
                requested: additional,
                cursor,
                max_size: self.max_size,
            });
        }
        if end <= self.capacity {
            return Ok(());
        }

        let new_capacity = grown_capacity(self.capacity, end);
        let mut grown = allocate(new_capacity)?;
        grown.extend_from_slice(&self.data);
        debug!(
            old_capacity = self.capacity,
            new_capacity, cursor, "Byte store grown"
        );
        self.data = grown;
        self.capacity = new_capacity;
        Ok(())
    }

    /// Дописывает байты после проверки ёмкости.
    pub fn append(
        &mut self,
        bytes: &[u8],
    ) -> Result<(), BufferError> {
        self.ensure_capacity(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn mark(&self) -> StoreMark {
        StoreMark {
            cursor: self.cursor(),
        }
    }

    /// Возвращает курсор к снимку. Снимок за курсором игнорируется.
    pub fn rewind(
        &mut self,
        mark: StoreMark,
    ) {
        self.data.truncate(mark.cursor);
    }

    /// Сбрасывает курсор, не трогая ёмкость.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Заменяет хранилище новым пустым с ёмкостью `size`.
    pub fn reallocate(
        &mut self,
        size: usize,
    ) -> Result<(), BufferError> {
        self.data = allocate(size)?;
        self.capacity = size;
        Ok(())
    }

    /// Освобождает память; хранилище остаётся пустым с нулевой ёмкостью.
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.capacity = 0;
    }

    /// Восстанавливает хранилище из готовой нагрузки.
    pub fn from_payload(
        payload: &[u8],
        max_size: usize,
    ) -> Result<Self, BufferError> {
        let mut store = Self::new(payload.len(), max_size)?;
        store.data.extend_from_slice(payload);
        Ok(store)
    }
}

fn allocate(size: usize) -> Result<Vec<u8>, BufferError> {
    let mut data = Vec::new();
    data.try_reserve_exact(size)
        .map_err(|_| BufferError::AllocationFailed { requested: size })?;
    Ok(data)
}
