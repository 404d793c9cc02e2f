// Canonical binary format for a fully built engine.
//
// Little-endian, no padding. The words table is written in handle order so
// the delete index can refer to entries by position; a reload therefore
// reproduces the exact same handle assignment.
//
//   magic "SymSpellCppPy" | u64 version
//   u64 max_edit | u64 prefix_length | u64 count_threshold | u32 algorithm
//   below-threshold table | words table | delete index | bigrams table
//   u64 compact_mask | u64 max_word_length | u64 bigram_count_min

use std::io::{Read, Write};

use ahash::AHashMap;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::dictionary::Handle;
use crate::distance::DistanceAlgorithm;
use crate::error::{Result, SymSpellError};
use crate::symspell::SymSpell;

const SERIALIZED_HEADER: &[u8; 13] = b"SymSpellCppPy";
const SERIALIZED_VERSION: u64 = 1;
// historical field; the maps manage their own load internally
const SERIALIZED_MAX_LOAD_FACTOR: f64 = 0.5;

fn stream_err(error: std::io::Error) -> SymSpellError {
    SymSpellError::Deserialization(format!("truncated or unreadable stream: {error}"))
}

fn write_str(writer: &mut impl Write, value: &str) -> Result<()> {
    writer.write_u64::<LittleEndian>(value.len() as u64)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

fn read_str(reader: &mut impl Read) -> Result<String> {
    let length = reader.read_u64::<LittleEndian>().map_err(stream_err)? as usize;
    let mut bytes = vec![0u8; length];
    reader.read_exact(&mut bytes).map_err(stream_err)?;
    String::from_utf8(bytes)
        .map_err(|_| SymSpellError::Deserialization("invalid utf-8 in stream".to_string()))
}

impl SymSpell {
    /// Serialize the engine, including the precalculated delete index, in
    /// the canonical binary format.
    pub fn to_stream(&self, mut writer: impl Write) -> Result<()> {
        writer.write_all(SERIALIZED_HEADER)?;
        writer.write_u64::<LittleEndian>(SERIALIZED_VERSION)?;

        writer.write_u64::<LittleEndian>(self.max_dictionary_edit_distance as u64)?;
        writer.write_u64::<LittleEndian>(self.prefix_length as u64)?;
        writer.write_u64::<LittleEndian>(self.count_threshold as u64)?;
        writer.write_u32::<LittleEndian>(self.distance_algorithm.to_u32())?;

        writer.write_u64::<LittleEndian>(self.dictionary.below_threshold_len() as u64)?;
        for (key, count) in self.dictionary.below_threshold_iter() {
            write_str(&mut writer, key)?;
            writer.write_i64::<LittleEndian>(count)?;
        }

        // words in insertion order; handles map onto the written positions
        writer.write_u64::<LittleEndian>(self.dictionary.word_count() as u64)?;
        let mut word_positions: AHashMap<Handle, u64> =
            AHashMap::with_capacity(self.dictionary.word_count());
        for (position, (handle, slot)) in self.dictionary.live_slots().enumerate() {
            write_str(&mut writer, &slot.term)?;
            writer.write_i64::<LittleEndian>(slot.count)?;
            word_positions.insert(handle, position as u64);
        }

        writer.write_u64::<LittleEndian>(self.deletes.entry_count() as u64)?;
        writer.write_f64::<LittleEndian>(SERIALIZED_MAX_LOAD_FACTOR)?;
        for (hash, bucket) in self.deletes.iter() {
            writer.write_i32::<LittleEndian>(hash)?;
            writer.write_u64::<LittleEndian>(bucket.len() as u64)?;
            for handle in bucket {
                writer.write_u64::<LittleEndian>(word_positions[handle])?;
            }
        }

        writer.write_u64::<LittleEndian>(self.bigrams.len() as u64)?;
        for (key, &count) in &self.bigrams {
            write_str(&mut writer, key)?;
            writer.write_i64::<LittleEndian>(count)?;
        }

        writer.write_u64::<LittleEndian>(u64::from(self.compact_mask))?;
        writer.write_u64::<LittleEndian>(self.max_length() as u64)?;
        writer.write_u64::<LittleEndian>(self.bigram_count_min as u64)?;
        Ok(())
    }

    /// Rebuild an engine from the canonical binary format.
    ///
    /// Rejects a mismatched magic or version; a truncated stream fails
    /// with a deserialization error.
    pub fn from_stream(mut reader: impl Read) -> Result<SymSpell> {
        let mut header = [0u8; SERIALIZED_HEADER.len()];
        reader.read_exact(&mut header).map_err(stream_err)?;
        if &header != SERIALIZED_HEADER {
            return Err(SymSpellError::Deserialization(
                "invalid serialized header".to_string(),
            ));
        }
        if reader.read_u64::<LittleEndian>().map_err(stream_err)? != SERIALIZED_VERSION {
            return Err(SymSpellError::Deserialization(
                "invalid serialized version".to_string(),
            ));
        }

        let max_edit = reader.read_u64::<LittleEndian>().map_err(stream_err)? as i64;
        let prefix_length = reader.read_u64::<LittleEndian>().map_err(stream_err)? as i64;
        let count_threshold = reader.read_u64::<LittleEndian>().map_err(stream_err)? as i64;
        let algorithm_raw = reader.read_u32::<LittleEndian>().map_err(stream_err)?;
        let algorithm = DistanceAlgorithm::from_u32(algorithm_raw).ok_or_else(|| {
            SymSpellError::Deserialization(format!("unknown distance algorithm {algorithm_raw}"))
        })?;

        let mut sym = SymSpell::new(max_edit, prefix_length, count_threshold, 0, algorithm)?;

        let below_size = reader.read_u64::<LittleEndian>().map_err(stream_err)?;
        for _ in 0..below_size {
            let key = read_str(&mut reader)?;
            let count = reader.read_i64::<LittleEndian>().map_err(stream_err)?;
            sym.dictionary.insert_below_threshold(&key, count);
        }

        let words_size = reader.read_u64::<LittleEndian>().map_err(stream_err)?;
        let mut handles: Vec<Handle> = Vec::with_capacity(words_size as usize);
        for _ in 0..words_size {
            let key = read_str(&mut reader)?;
            let count = reader.read_i64::<LittleEndian>().map_err(stream_err)?;
            handles.push(sym.dictionary.insert_active(&key, count));
        }

        let bucket_count = reader.read_u64::<LittleEndian>().map_err(stream_err)?;
        let _max_load_factor = reader.read_f64::<LittleEndian>().map_err(stream_err)?;
        sym.deletes.reserve(bucket_count as usize);
        for _ in 0..bucket_count {
            let hash = reader.read_i32::<LittleEndian>().map_err(stream_err)?;
            let list_len = reader.read_u64::<LittleEndian>().map_err(stream_err)?;
            for _ in 0..list_len {
                let word_index = reader.read_u64::<LittleEndian>().map_err(stream_err)?;
                let handle = *handles.get(word_index as usize).ok_or_else(|| {
                    SymSpellError::Deserialization(format!("word index {word_index} out of range"))
                })?;
                sym.deletes.insert(hash, handle);
            }
        }

        let bigram_size = reader.read_u64::<LittleEndian>().map_err(stream_err)?;
        for _ in 0..bigram_size {
            let key = read_str(&mut reader)?;
            let count = reader.read_i64::<LittleEndian>().map_err(stream_err)?;
            sym.bigrams.insert(key.into_boxed_str(), count);
        }

        sym.compact_mask = reader.read_u64::<LittleEndian>().map_err(stream_err)? as u32;
        let max_word_length = reader.read_u64::<LittleEndian>().map_err(stream_err)? as i64;
        sym.dictionary.set_max_word_length(max_word_length);
        sym.bigram_count_min = reader.read_u64::<LittleEndian>().map_err(stream_err)? as i64;

        Ok(sym)
    }

    /// [`SymSpell::to_stream`] into a fresh byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.to_stream(&mut buffer)?;
        Ok(buffer)
    }

    /// [`SymSpell::from_stream`] over an in-memory buffer.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<SymSpell> {
        SymSpell::from_stream(&mut bytes)
    }
}
