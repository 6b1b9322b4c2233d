// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::{Read, Write};
use std::sync::{Arc, Mutex};

/// Output stream shared between the command and background tasks.
pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;

pub type SharedReader = Arc<Mutex<dyn Read + Send>>;

pub fn shared_writer<W: Write + Send + 'static>(writer: W) -> SharedWriter {
    Arc::new(Mutex::new(writer))
}

pub fn shared_reader<R: Read + Send + 'static>(reader: R) -> SharedReader {
    Arc::new(Mutex::new(reader))
}

/// Writes `text` to a shared writer, recovering the lock if a writer panicked.
pub fn write_shared(writer: &SharedWriter, text: &str) -> std::io::Result<()> {
    write_shared_bytes(writer, text.as_bytes())
}

pub fn write_shared_bytes(writer: &SharedWriter, bytes: &[u8]) -> std::io::Result<()> {
    let mut guard = writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.write_all(bytes)?;
    guard.flush()
}

/// In-memory writer whose contents stay readable after it is shared.
#[derive(Clone, Default, Debug)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_is_shared_across_clones() {
        let buffer = Buffer::new();
        let writer = shared_writer(buffer.clone());
        write_shared(&writer, "hello\n").unwrap();
        write_shared(&writer, "world\n").unwrap();
        assert_eq!(buffer.contents(), "hello\nworld\n");
    }
}
