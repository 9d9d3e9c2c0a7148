//! 下载完成后的文件校验：计算摘要并与期望值（忽略大小写）比较。
//!
//! 读取整个文件，属于阻塞操作，调用方应放到 `spawn_blocking` 里执行。

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::internal::errors::FileVerificationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationType {
    #[default]
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

const READ_BUFFER: usize = 64 * 1024;

fn feed<R: Read>(reader: &mut R, mut update: impl FnMut(&[u8])) -> std::io::Result<()> {
    let mut buf = vec![0u8; READ_BUFFER];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        update(&buf[..n]);
    }
}

fn digest_with<D: Digest, R: Read>(reader: &mut R) -> std::io::Result<String> {
    let mut hasher = D::new();
    feed(reader, |chunk| hasher.update(chunk))?;
    Ok(hex::encode(hasher.finalize()))
}

/// 计算文件摘要，返回小写十六进制字符串。
pub fn digest(path: &Path, kind: VerificationType) -> Result<String, FileVerificationError> {
    if !path.exists() {
        return Err(FileVerificationError::FileDoesNotExist {
            path: path.to_path_buf(),
        });
    }
    let read_failed = |source| FileVerificationError::ReadDataFailed {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(read_failed)?);
    let hex = match kind {
        VerificationType::Md5 => {
            let mut ctx = md5::Context::new();
            feed(&mut reader, |chunk| ctx.consume(chunk)).map_err(read_failed)?;
            format!("{:x}", ctx.compute())
        }
        VerificationType::Sha1 => digest_with::<Sha1, _>(&mut reader).map_err(read_failed)?,
        VerificationType::Sha256 => digest_with::<Sha256, _>(&mut reader).map_err(read_failed)?,
        VerificationType::Sha512 => digest_with::<Sha512, _>(&mut reader).map_err(read_failed)?,
    };
    Ok(hex)
}

/// 校验文件摘要是否等于 `code`（忽略大小写）。
pub fn validate_file(
    path: &Path,
    code: &str,
    kind: VerificationType,
) -> Result<(), FileVerificationError> {
    if code.is_empty() {
        return Err(FileVerificationError::CodeEmpty);
    }
    let actual = digest(path, kind)?;
    if actual.eq_ignore_ascii_case(code) {
        Ok(())
    } else {
        Err(FileVerificationError::CodeMismatch {
            expected: code.to_ascii_lowercase(),
            actual,
        })
    }
}
