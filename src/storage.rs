//! RocksDB storage layer

use std::path::Path;

use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};

#[derive(Clone)]
pub struct Store {
    db: std::sync::Arc<DB>,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rocksdb::Error> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(128 * 1024 * 1024); // 128MB write buffer for high throughput
        opts.set_max_write_buffer_number(4);
        opts.set_target_file_size_base(128 * 1024 * 1024);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let db = DB::open(&opts, path)?;
        Ok(Self {
            db: std::sync::Arc::new(db),
        })
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, rocksdb::Error> {
        self.db.get(key)
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), rocksdb::Error> {
        self.db.put(key, value)
    }

    pub fn delete(&self, key: &[u8]) -> Result<(), rocksdb::Error> {
        self.db.delete(key)
    }

    pub fn batch_write<K, V>(&self, items: &[(K, V)]) -> Result<(), rocksdb::Error>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let mut batch = WriteBatch::default();
        for (key, value) in items {
            batch.put(key, value);
        }
        self.db.write(batch)
    }

    /// Forward scan of keys under `prefix`, starting strictly after `cursor`
    /// when one is given, capped at `limit` rows.
    pub fn scan_prefix(
        &self,
        prefix: &[u8],
        cursor: Option<&[u8]>,
        limit: usize,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, rocksdb::Error> {
        let start = cursor.unwrap_or(prefix);
        let iter = self
            .db
            .iterator(IteratorMode::From(start, Direction::Forward));

        let mut rows = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if Some(key.as_ref() as &[u8]) == cursor {
                continue;
            }
            if !key.starts_with(prefix) {
                break;
            }
            rows.push((key.to_vec(), value.to_vec()));
            if rows.len() >= limit {
                break;
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn put_get_delete_roundtrip() {
        let (store, _dir) = open_temp();

        store.put(b"k1", b"v1").unwrap();
        assert_eq!(store.get(b"k1").unwrap(), Some(b"v1".to_vec()));

        store.delete(b"k1").unwrap();
        assert_eq!(store.get(b"k1").unwrap(), None);
    }

    #[test]
    fn batch_write_is_visible_as_a_unit() {
        let (store, _dir) = open_temp();

        store
            .batch_write(&[(b"a".to_vec(), b"1".to_vec()), (b"b".to_vec(), b"2".to_vec())])
            .unwrap();

        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get(b"b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn scan_prefix_pages_with_a_cursor() {
        let (store, _dir) = open_temp();

        for i in 0..5u8 {
            store.put(format!("p:{i}").as_bytes(), &[i]).unwrap();
        }
        store.put(b"q:0", b"other").unwrap();

        let first = store.scan_prefix(b"p:", None, 2).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].0, b"p:0".to_vec());
        assert_eq!(first[1].0, b"p:1".to_vec());

        let cursor = first.last().map(|(k, _)| k.clone()).unwrap();
        let second = store.scan_prefix(b"p:", Some(&cursor), 10).unwrap();
        let keys: Vec<Vec<u8>> = second.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"p:2".to_vec(), b"p:3".to_vec(), b"p:4".to_vec()]);
    }
}
