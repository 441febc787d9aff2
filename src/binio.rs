//! ネイティブエンディアンの`i32`列の読み書き

use crate::error::{Error, Result};
use std::io::{ErrorKind, Read, Write};

pub(crate) fn write_i32(w: &mut impl Write, v: i32) -> Result<()> {
    w.write_all(&v.to_ne_bytes())?;
    Ok(())
}

/// 添字や個数を`i32`として書き出す
pub(crate) fn write_len(w: &mut impl Write, v: usize) -> Result<()> {
    let v = i32::try_from(v).map_err(|_| Error::Format(format!("{v} does not fit in i32")))?;
    write_i32(w, v)
}

pub(crate) fn read_i32(r: &mut impl Read) -> Result<i32> {
    let mut buf = [0; 4];
    match r.read_exact(&mut buf) {
        Ok(()) => Ok(i32::from_ne_bytes(buf)),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            Err(Error::Format("unexpected end of file".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// 非負の`i32`を読む
pub(crate) fn read_len(r: &mut impl Read, what: &str) -> Result<usize> {
    let v = read_i32(r)?;
    usize::try_from(v).map_err(|_| Error::Format(format!("negative {what}: {v}")))
}

/// 長さ付きの`i32`列を書き出す
pub(crate) fn write_list(w: &mut impl Write, list: &[usize]) -> Result<()> {
    write_len(w, list.len())?;
    for &v in list {
        write_len(w, v)?;
    }
    Ok(())
}

/// 長さ付きの`i32`列を読む
pub(crate) fn read_list(r: &mut impl Read, what: &str) -> Result<Vec<usize>> {
    let len = read_len(r, what)?;
    // 長さは信用しない
    let mut list = Vec::with_capacity(len.min(1 << 16));
    for _ in 0..len {
        list.push(read_len(r, what)?);
    }
    Ok(list)
}

/// 末尾に余計なバイトが無いことを確かめる
pub(crate) fn expect_eof(r: &mut impl Read) -> Result<()> {
    let mut buf = [0; 1];
    match r.read(&mut buf)? {
        0 => Ok(()),
        _ => Err(Error::Format("trailing bytes".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list() {
        let mut buf = vec![];
        write_list(&mut buf, &[0, 3, 7]).unwrap();
        assert_eq!(buf.len(), 16);
        let mut r = buf.as_slice();
        assert_eq!(read_list(&mut r, "x").unwrap(), vec![0, 3, 7]);
        expect_eof(&mut r).unwrap();
    }

    #[test]
    fn truncated() {
        let mut buf = vec![];
        write_i32(&mut buf, 5).unwrap();
        buf.pop();
        assert!(matches!(read_i32(&mut buf.as_slice()), Err(Error::Format(_))));
        let mut buf = vec![];
        write_i32(&mut buf, -1).unwrap();
        assert!(matches!(read_len(&mut buf.as_slice(), "x"), Err(Error::Format(_))));
    }
}
