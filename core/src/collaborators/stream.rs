use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Read, Write};

// Header magic, then records of a big-endian u32 length and JSON payload.
pub const STREAM_MAGIC: [u8; 4] = *b"FCR1";

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("end of stream while reading {0}")]
    EndOfStream(&'static str),
    #[error("invalid stream header: {0:02x?}")]
    BadMagic([u8; 4]),
    #[error("record of {0} bytes exceeds the frame limit")]
    Oversized(u64),
    #[error("malformed record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("stream i/o failure: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug)]
pub struct RecordReader<R> {
    inner: R,
}

impl<R: Read> RecordReader<R> {
    pub fn open(mut inner: R) -> Result<Self, StreamError> {
        let mut magic = [0u8; 4];
        read_frame(&mut inner, &mut magic, "stream header")?;
        if magic != STREAM_MAGIC {
            return Err(StreamError::BadMagic(magic));
        }
        Ok(Self { inner })
    }

    pub fn read_record<T: DeserializeOwned>(&mut self) -> Result<T, StreamError> {
        let mut len = [0u8; 4];
        read_frame(&mut self.inner, &mut len, "record length")?;
        let len = u32::from_be_bytes(len);
        if len > MAX_RECORD_LEN {
            return Err(StreamError::Oversized(u64::from(len)));
        }

        let mut payload = vec![0u8; len as usize];
        read_frame(&mut self.inner, &mut payload, "record payload")?;
        Ok(serde_json::from_slice(&payload)?)
    }
}

const MAX_RECORD_LEN: u32 = 16 * 1024 * 1024;

fn read_frame<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    what: &'static str,
) -> Result<(), StreamError> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            Err(StreamError::EndOfStream(what))
        }
        Err(err) => Err(StreamError::Io(err)),
    }
}

#[derive(Debug)]
pub struct RecordWriter<W> {
    inner: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn create(mut inner: W) -> Result<Self, StreamError> {
        inner.write_all(&STREAM_MAGIC)?;
        Ok(Self { inner })
    }

    pub fn write_record<T: Serialize>(&mut self, record: &T) -> Result<(), StreamError> {
        let payload = serde_json::to_vec(record)?;
        let len = u32::try_from(payload.len())
            .ok()
            .filter(|len| *len <= MAX_RECORD_LEN)
            .ok_or(StreamError::Oversized(payload.len() as u64))?;
        self.inner.write_all(&len.to_be_bytes())?;
        self.inner.write_all(&payload)?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W, StreamError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
