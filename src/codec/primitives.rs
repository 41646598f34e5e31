//! Чтение и запись скаляров.
//!
//! Все многобайтовые поля пишутся в порядке little-endian. Запись идёт во
//! временный `Vec<u8>` и не может завершиться ошибкой; чтение проверяет
//! границы и сообщает смещение, на котором поток оборвался.

use byteorder::{ByteOrder, LittleEndian};
use tagpack_error::BufferError;

use super::narrow_float::{decode_f16, decode_f24, encode_f16, encode_f24};

/// Порог длины строки: короче — длина в 1 байт, иначе в 2 байта.
pub const SHORT_STRING_LIMIT: usize = 256;
/// Наибольшая длина строки, которую вмещает 2-байтовое поле длины.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Запись скаляров в конец байтового вектора.
pub struct Encoder<'a> {
    out: &'a mut Vec<u8>,
}

impl<'a> Encoder<'a> {
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out }
    }

    /// Сколько байт уже записано в целевой вектор.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn put_u8(
        &mut self,
        v: u8,
    ) {
        self.out.push(v);
    }

    pub fn put_i8(
        &mut self,
        v: i8,
    ) {
        self.out.push(v as u8);
    }

    pub fn put_u16(
        &mut self,
        v: u16,
    ) {
        let mut buf = [0; 2];
        LittleEndian::write_u16(&mut buf, v);
        self.out.extend_from_slice(&buf);
    }

    pub fn put_i16(
        &mut self,
        v: i16,
    ) {
        let mut buf = [0; 2];
        LittleEndian::write_i16(&mut buf, v);
        self.out.extend_from_slice(&buf);
    }

    pub fn put_u24(
        &mut self,
        v: u32,
    ) {
        let mut buf = [0; 3];
        LittleEndian::write_u24(&mut buf, v & 0x00FF_FFFF);
        self.out.extend_from_slice(&buf);
    }

    pub fn put_u32(
        &mut self,
        v: u32,
    ) {
        let mut buf = [0; 4];
        LittleEndian::write_u32(&mut buf, v);
        self.out.extend_from_slice(&buf);
    }

    pub fn put_i32(
        &mut self,
        v: i32,
    ) {
        let mut buf = [0; 4];
        LittleEndian::write_i32(&mut buf, v);
        self.out.extend_from_slice(&buf);
    }

    pub fn put_f16(
        &mut self,
        v: f64,
    ) {
        self.put_u16(encode_f16(v));
    }

    pub fn put_f24(
        &mut self,
        v: f64,
    ) {
        self.put_u24(encode_f24(v));
    }

    pub fn put_f32(
        &mut self,
        v: f32,
    ) {
        let mut buf = [0; 4];
        LittleEndian::write_f32(&mut buf, v);
        self.out.extend_from_slice(&buf);
    }

    pub fn put_f64(
        &mut self,
        v: f64,
    ) {
        let mut buf = [0; 8];
        LittleEndian::write_f64(&mut buf, v);
        self.out.extend_from_slice(&buf);
    }

    pub fn put_bytes(
        &mut self,
        bytes: &[u8],
    ) {
        self.out.extend_from_slice(bytes);
    }
}

/// Чтение скаляров из среза с отслеживанием позиции.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Текущее смещение от начала среза.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(
        &mut self,
        n: usize,
    ) -> Result<&'a [u8], BufferError> {
        if self.remaining() < n {
            return Err(BufferError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Следующий байт без сдвига позиции.
    pub fn peek_u8(&self) -> Result<u8, BufferError> {
        self.data.get(self.pos).copied().ok_or(BufferError::UnexpectedEof {
            offset: self.pos,
            needed: 1,
            available: 0,
        })
    }

    pub fn get_u8(&mut self) -> Result<u8, BufferError> {
        Ok(self.take(1)?[0])
    }

    pub fn get_i8(&mut self) -> Result<i8, BufferError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn get_u16(&mut self) -> Result<u16, BufferError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn get_i16(&mut self) -> Result<i16, BufferError> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn get_u24(&mut self) -> Result<u32, BufferError> {
        Ok(LittleEndian::read_u24(self.take(3)?))
    }

    pub fn get_u32(&mut self) -> Result<u32, BufferError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn get_i32(&mut self) -> Result<i32, BufferError> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn get_f16(&mut self) -> Result<f64, BufferError> {
        Ok(decode_f16(self.get_u16()?))
    }

    pub fn get_f24(&mut self) -> Result<f64, BufferError> {
        Ok(decode_f24(self.get_u24()?))
    }

    pub fn get_f32(&mut self) -> Result<f32, BufferError> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn get_f64(&mut self) -> Result<f64, BufferError> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    pub fn get_bytes(
        &mut self,
        n: usize,
    ) -> Result<&'a [u8], BufferError> {
        self.take(n)
    }

    /// Читает `n` байт как UTF-8 строку.
    pub fn get_string(
        &mut self,
        n: usize,
    ) -> Result<String, BufferError> {
        let offset = self.pos;
        let bytes = self.take(n)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| BufferError::InvalidUtf8 { offset })
    }
}
