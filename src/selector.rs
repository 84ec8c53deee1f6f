use crate::error::SelectError;
use crate::store::{checked_usable_records, Record, RECORD_LENGTH, RECORD_STRIDE};
use chrono::NaiveDate;
use log::debug;
use rand::Rng;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// First day of the daily rotation.
pub const EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2009, 6, 1) {
    Some(date) => date,
    None => panic!("invalid epoch date"),
};

pub fn epoch() -> NaiveDate {
    EPOCH
}

/// Whole calendar days from `epoch` to `today`, clamped at zero.
pub fn days_passed(epoch: NaiveDate, today: NaiveDate) -> u64 {
    let days = today.signed_duration_since(epoch).num_days();
    days.max(0) as u64
}

pub fn daily_index(epoch: NaiveDate, today: NaiveDate, usable: u64) -> u64 {
    days_passed(epoch, today) % usable
}

/// Returns the record scheduled for `today`.
pub fn select_daily_record(
    store_path: &Path,
    epoch: NaiveDate,
    today: NaiveDate,
) -> Result<Record, SelectError> {
    let usable = checked_usable_records(store_path)?;
    let index = daily_index(epoch, today, usable);
    debug!(
        "daily record: today={} usable={} index={}",
        today, usable, index
    );
    read_record(store_path, index)
}

/// Returns a uniformly chosen record. Repeats across calls are possible.
pub fn select_random_record<R: Rng + ?Sized>(
    store_path: &Path,
    rng: &mut R,
) -> Result<Record, SelectError> {
    let usable = checked_usable_records(store_path)?;
    let index = rng.gen_range(0..usable);
    debug!("random record: usable={} index={}", usable, index);
    read_record(store_path, index)
}

/// Reads the payload of record `index`, without its terminator.
pub fn read_record(store_path: &Path, index: u64) -> Result<Record, SelectError> {
    let read_err = |source| SelectError::Read {
        index: Some(index),
        source,
    };
    let offset = index.checked_mul(RECORD_STRIDE).ok_or_else(|| {
        read_err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "record offset overflows u64",
        ))
    })?;

    let mut file = File::open(store_path).map_err(read_err)?;
    file.seek(SeekFrom::Start(offset)).map_err(read_err)?;

    let mut record = [0u8; RECORD_LENGTH];
    file.read_exact(&mut record).map_err(read_err)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;
    use std::path::PathBuf;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Writes `count` full records; record `i` is filled with digit `i % 10`.
    fn write_store(dir: &Path, count: usize) -> PathBuf {
        let mut data = Vec::new();
        for i in 0..count {
            data.extend(std::iter::repeat(b'0' + (i % 10) as u8).take(RECORD_LENGTH));
            data.extend_from_slice(b"\r\n");
        }
        let path = dir.join("store.sudoku");
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_days_passed() {
        assert_eq!(days_passed(epoch(), epoch()), 0);
        assert_eq!(days_passed(epoch(), date(2009, 6, 5)), 4);
        assert_eq!(days_passed(epoch(), date(2010, 6, 1)), 365);
        assert_eq!(days_passed(epoch(), date(2009, 5, 31)), 0);
        assert_eq!(days_passed(epoch(), date(1999, 1, 1)), 0);
    }

    #[test]
    fn test_daily_index_cycles_through_every_record() {
        let usable = 7;
        let start = date(2015, 2, 25);
        let first = daily_index(epoch(), start, usable);
        let mut seen = Vec::new();
        for offset in 0..usable {
            let day = start + chrono::Duration::days(offset as i64);
            seen.push(daily_index(epoch(), day, usable));
        }
        let expected: Vec<u64> = (0..usable).map(|i| (first + i) % usable).collect();
        assert_eq!(seen, expected);

        let mut sorted = seen.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..usable).collect::<Vec<_>>());
    }

    #[test]
    fn test_worked_example() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(dir.path(), 5);
        assert_eq!(fs::metadata(&path).unwrap().len(), 415);

        let record = select_daily_record(&path, epoch(), date(2009, 6, 5)).unwrap();
        assert_eq!(record, [b'0'; RECORD_LENGTH]);

        let record = select_daily_record(&path, epoch(), date(2009, 6, 7)).unwrap();
        assert_eq!(record, [b'2'; RECORD_LENGTH]);
    }

    #[test]
    fn test_before_epoch_matches_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(dir.path(), 6);
        let at_epoch = select_daily_record(&path, epoch(), epoch()).unwrap();
        let before = select_daily_record(&path, epoch(), date(2001, 3, 14)).unwrap();
        assert_eq!(at_epoch, before);
        assert_eq!(at_epoch, [b'0'; RECORD_LENGTH]);
    }

    #[test]
    fn test_trailing_record_never_selected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(dir.path(), 3);
        for offset in 0..10 {
            let day = epoch() + chrono::Duration::days(offset);
            let record = select_daily_record(&path, epoch(), day).unwrap();
            assert_ne!(record, [b'2'; RECORD_LENGTH]);
        }
    }

    #[test]
    fn test_insufficient_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(dir.path(), 1);
        let err = select_daily_record(&path, epoch(), epoch()).unwrap_err();
        assert!(matches!(err, SelectError::InsufficientData { .. }));

        let mut rng = StdRng::seed_from_u64(1);
        let err = select_random_record(&path, &mut rng).unwrap_err();
        assert!(matches!(err, SelectError::InsufficientData { .. }));
    }

    #[test]
    fn test_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sudoku");
        let err = select_daily_record(&path, epoch(), epoch()).unwrap_err();
        assert!(matches!(err, SelectError::NotFound(_)));
    }

    #[test]
    fn test_truncated_record_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.sudoku");
        let mut data = vec![b'5'; RECORD_LENGTH];
        data.extend_from_slice(b"\r\n");
        data.extend(vec![b'6'; 40]);
        fs::write(&path, data).unwrap();

        assert_eq!(read_record(&path, 0).unwrap(), [b'5'; RECORD_LENGTH]);
        let err = read_record(&path, 1).unwrap_err();
        assert!(matches!(err, SelectError::Read { index: Some(1), .. }));
    }

    #[test]
    fn test_out_of_range_index_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(dir.path(), 3);

        let err = read_record(&path, u64::MAX / 2).unwrap_err();
        match err {
            SelectError::Read { index, source } => {
                assert_eq!(index, Some(u64::MAX / 2));
                assert_eq!(source.kind(), io::ErrorKind::InvalidInput);
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = read_record(&path, 3).unwrap_err();
        assert!(matches!(err, SelectError::Read { index: Some(3), .. }));
    }

    #[test]
    fn test_epoch_date() {
        assert_eq!(epoch(), date(2009, 6, 1));
    }

    #[test]
    fn test_random_record_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(dir.path(), 4);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let record = select_random_record(&path, &mut rng).unwrap();
            assert!(matches!(record[0], b'0' | b'1' | b'2'));
            assert!(record.iter().all(|&b| b == record[0]));
        }
    }

    #[test]
    fn test_random_record_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(dir.path(), 9);
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(
                select_random_record(&path, &mut a).unwrap(),
                select_random_record(&path, &mut b).unwrap()
            );
        }
    }
}
