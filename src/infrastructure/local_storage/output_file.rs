// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Destination files for exported data.
//!
//! Paths ending in `.gz` are gzip-compressed on the fly; anything else is
//! written as plain text. Both go through a 128 KiB `BufWriter`.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const BUFFER_CAPACITY: usize = 128 * 1024;

/// A created-or-truncated output file.
pub enum OutputFile {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputFile {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: &str) -> io::Result<Self> {
        let file = File::create(path)?;
        let buf_writer = BufWriter::with_capacity(BUFFER_CAPACITY, file);
        if is_gzip_path(path) {
            Ok(OutputFile::Gzip(GzEncoder::new(buf_writer, Compression::fast())))
        } else {
            Ok(OutputFile::Plain(buf_writer))
        }
    }

    /// Flushes buffered data and, for gzip, writes the trailer.
    pub fn finish(self) -> io::Result<()> {
        match self {
            OutputFile::Plain(mut w) => w.flush(),
            OutputFile::Gzip(enc) => enc.finish()?.flush(),
        }
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputFile::Plain(w) => w.write(buf),
            OutputFile::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputFile::Plain(w) => w.flush(),
            OutputFile::Gzip(w) => w.flush(),
        }
    }
}

fn is_gzip_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}
