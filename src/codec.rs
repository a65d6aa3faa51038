//! codec - бинарное кодирование строк, операций и образа таблиц (LE, byteorder).
//!
//! Строки: [len u32][utf8 bytes].
//! Book:   [id i64][title str][author_id i64][qty u32]
//! Author: [id i64][name str][country str]
//! Op:     [tag u8] + поля (см. OP_*).
//! Txn payload (WAL): [count u32] + ops.
//! Tables (image):    [book_seq i64][n u32]{Book}[n u32]{Author}[backup u8]
//!                    и, если backup=1, [n u32]{Book}[n u32]{Author}.

use anyhow::{anyhow, bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use crate::model::{Author, Book};
use crate::tables::{BackupArea, Op, TableId, Tables};

const OP_INSERT_BOOK: u8 = 1;
const OP_INSERT_AUTHOR: u8 = 2;
const OP_UPDATE_BOOK: u8 = 3;
const OP_DELETE_BOOK: u8 = 4;
const OP_CREATE_BACKUP_AREA: u8 = 5;
const OP_CLEAR: u8 = 6;
const OP_COPY: u8 = 7;

// Верхняя граница длины строки - защита от мусорного len при порче данных.
const MAX_STR_LEN: u32 = 16 * 1024 * 1024;

// ---------------- primitives ----------------

fn put_str(out: &mut Vec<u8>, s: &str) -> Result<()> {
    let len = u32::try_from(s.len()).map_err(|_| anyhow!("string too long: {} bytes", s.len()))?;
    out.write_u32::<LittleEndian>(len)?;
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

fn get_str(c: &mut Cursor<&[u8]>) -> Result<String> {
    let len = c.read_u32::<LittleEndian>()?;
    if len > MAX_STR_LEN {
        bail!("string length {} exceeds limit", len);
    }
    let mut buf = vec![0u8; len as usize];
    c.read_exact(&mut buf)?;
    String::from_utf8(buf).context("string is not valid utf-8")
}

fn put_count(out: &mut Vec<u8>, n: usize) -> Result<()> {
    let n = u32::try_from(n).map_err(|_| anyhow!("too many rows: {}", n))?;
    out.write_u32::<LittleEndian>(n)?;
    Ok(())
}

// ---------------- rows ----------------

fn put_book(out: &mut Vec<u8>, b: &Book) -> Result<()> {
    out.write_i64::<LittleEndian>(b.id)?;
    put_str(out, &b.title)?;
    out.write_i64::<LittleEndian>(b.author_id)?;
    out.write_u32::<LittleEndian>(b.qty)?;
    Ok(())
}

fn get_book(c: &mut Cursor<&[u8]>) -> Result<Book> {
    let id = c.read_i64::<LittleEndian>()?;
    let title = get_str(c)?;
    let author_id = c.read_i64::<LittleEndian>()?;
    let qty = c.read_u32::<LittleEndian>()?;
    Ok(Book {
        id,
        title,
        author_id,
        qty,
    })
}

fn put_author(out: &mut Vec<u8>, a: &Author) -> Result<()> {
    out.write_i64::<LittleEndian>(a.id)?;
    put_str(out, &a.name)?;
    put_str(out, &a.country)?;
    Ok(())
}

fn get_author(c: &mut Cursor<&[u8]>) -> Result<Author> {
    let id = c.read_i64::<LittleEndian>()?;
    let name = get_str(c)?;
    let country = get_str(c)?;
    Ok(Author { id, name, country })
}

fn put_books<'a>(out: &mut Vec<u8>, rows: impl ExactSizeIterator<Item = &'a Book>) -> Result<()> {
    put_count(out, rows.len())?;
    for b in rows {
        put_book(out, b)?;
    }
    Ok(())
}

fn get_books(c: &mut Cursor<&[u8]>) -> Result<BTreeMap<i64, Book>> {
    let n = c.read_u32::<LittleEndian>()?;
    let mut m = BTreeMap::new();
    for _ in 0..n {
        let b = get_book(c)?;
        if m.insert(b.id, b).is_some() {
            bail!("duplicate book id in image");
        }
    }
    Ok(m)
}

fn put_authors<'a>(
    out: &mut Vec<u8>,
    rows: impl ExactSizeIterator<Item = &'a Author>,
) -> Result<()> {
    put_count(out, rows.len())?;
    for a in rows {
        put_author(out, a)?;
    }
    Ok(())
}

fn get_authors(c: &mut Cursor<&[u8]>) -> Result<BTreeMap<i64, Author>> {
    let n = c.read_u32::<LittleEndian>()?;
    let mut m = BTreeMap::new();
    for _ in 0..n {
        let a = get_author(c)?;
        if m.insert(a.id, a).is_some() {
            bail!("duplicate author id in image");
        }
    }
    Ok(m)
}

fn ensure_consumed(c: &Cursor<&[u8]>, what: &str) -> Result<()> {
    let len = c.get_ref().len() as u64;
    if c.position() != len {
        bail!(
            "{}: {} trailing byte(s) after decode",
            what,
            len - c.position()
        );
    }
    Ok(())
}

// ---------------- ops ----------------

fn put_op(out: &mut Vec<u8>, op: &Op) -> Result<()> {
    match op {
        Op::InsertBook(b) => {
            out.write_u8(OP_INSERT_BOOK)?;
            put_book(out, b)?;
        }
        Op::InsertAuthor(a) => {
            out.write_u8(OP_INSERT_AUTHOR)?;
            put_author(out, a)?;
        }
        Op::UpdateBook(b) => {
            out.write_u8(OP_UPDATE_BOOK)?;
            put_book(out, b)?;
        }
        Op::DeleteBook(id) => {
            out.write_u8(OP_DELETE_BOOK)?;
            out.write_i64::<LittleEndian>(*id)?;
        }
        Op::CreateBackupArea => out.write_u8(OP_CREATE_BACKUP_AREA)?,
        Op::Clear(t) => {
            out.write_u8(OP_CLEAR)?;
            out.write_u8(t.tag())?;
        }
        Op::Copy { src, dst } => {
            out.write_u8(OP_COPY)?;
            out.write_u8(src.tag())?;
            out.write_u8(dst.tag())?;
        }
    }
    Ok(())
}

fn get_op(c: &mut Cursor<&[u8]>) -> Result<Op> {
    let tag = c.read_u8()?;
    Ok(match tag {
        OP_INSERT_BOOK => Op::InsertBook(get_book(c)?),
        OP_INSERT_AUTHOR => Op::InsertAuthor(get_author(c)?),
        OP_UPDATE_BOOK => Op::UpdateBook(get_book(c)?),
        OP_DELETE_BOOK => Op::DeleteBook(c.read_i64::<LittleEndian>()?),
        OP_CREATE_BACKUP_AREA => Op::CreateBackupArea,
        OP_CLEAR => Op::Clear(TableId::from_tag(c.read_u8()?)?),
        OP_COPY => {
            let src = TableId::from_tag(c.read_u8()?)?;
            let dst = TableId::from_tag(c.read_u8()?)?;
            Op::Copy { src, dst }
        }
        other => bail!("unknown op tag {}", other),
    })
}

/// Закодировать операции одной транзакции в payload записи WAL.
pub fn encode_txn(ops: &[Op]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(16 + ops.len() * 32);
    put_count(&mut out, ops.len())?;
    for op in ops {
        put_op(&mut out, op)?;
    }
    Ok(out)
}

pub fn decode_txn(payload: &[u8]) -> Result<Vec<Op>> {
    let mut c = Cursor::new(payload);
    let n = c.read_u32::<LittleEndian>().context("txn op count")?;
    let mut ops = Vec::with_capacity(n.min(1024) as usize);
    for i in 0..n {
        ops.push(get_op(&mut c).with_context(|| format!("decode op #{}", i))?);
    }
    ensure_consumed(&c, "txn payload")?;
    Ok(ops)
}

// ---------------- tables image ----------------

pub fn encode_tables(t: &Tables) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(64 + (t.books.len() + t.authors.len()) * 48);
    out.write_i64::<LittleEndian>(t.book_seq)?;
    put_books(&mut out, t.books.values())?;
    put_authors(&mut out, t.authors.values())?;
    match &t.backup {
        None => out.write_u8(0)?,
        Some(area) => {
            out.write_u8(1)?;
            put_books(&mut out, area.books.values())?;
            put_authors(&mut out, area.authors.values())?;
        }
    }
    Ok(out)
}

pub fn decode_tables(payload: &[u8]) -> Result<Tables> {
    let mut c = Cursor::new(payload);
    let book_seq = c.read_i64::<LittleEndian>().context("book_seq")?;
    let books = get_books(&mut c).context("books")?;
    let authors = get_authors(&mut c).context("authors")?;
    let backup = match c.read_u8().context("backup flag")? {
        0 => None,
        1 => Some(BackupArea {
            books: get_books(&mut c).context("backup books")?,
            authors: get_authors(&mut c).context("backup authors")?,
        }),
        other => bail!("bad backup flag {}", other),
    };
    ensure_consumed(&c, "tables image")?;
    Ok(Tables {
        books,
        authors,
        book_seq,
        backup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_image_roundtrip_with_backup_area() {
        let mut t = Tables::new();
        t.apply(&Op::InsertAuthor(Author {
            id: 1290,
            name: "Charles Dickens".into(),
            country: "England".into(),
        }))
        .unwrap();
        t.apply(&Op::InsertBook(Book {
            id: 3001,
            title: "A Tale of Two Cities".into(),
            author_id: 1290,
            qty: 30,
        }))
        .unwrap();
        t.apply(&Op::CreateBackupArea).unwrap();
        t.apply(&Op::Copy { src: TableId::Book, dst: TableId::BackupBook }).unwrap();

        let bytes = encode_tables(&t).unwrap();
        let back = decode_tables(&bytes).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.book_seq(), 3001);
    }

    #[test]
    fn truncated_txn_payload_is_rejected() {
        let ops = vec![
            Op::DeleteBook(7),
            Op::Copy { src: TableId::BackupAuthor, dst: TableId::Author },
        ];
        let bytes = encode_txn(&ops).unwrap();
        assert_eq!(decode_txn(&bytes).unwrap(), ops);
        assert!(decode_txn(&bytes[..bytes.len() - 1]).is_err());

        let mut extra = bytes.clone();
        extra.push(0);
        assert!(decode_txn(&extra).is_err());
    }
}
