use super::CostSample;
use anyhow::Result;
use csv::Writer;
use std::fs::File;
use std::path::Path;

pub struct HistoryLogger {
    writer: Writer<File>,
}

impl HistoryLogger {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log(&mut self, sample: &CostSample) -> Result<()> {
        self.writer.serialize(sample)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn log_batch(&mut self, samples: &[CostSample]) -> Result<()> {
        for sample in samples {
            self.writer.serialize(sample)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_header_and_rows() {
        let path = std::env::temp_dir().join(format!("dcopsim_history_{}.csv", std::process::id()));
        {
            let mut logger = HistoryLogger::new(&path).unwrap();
            logger
                .log_batch(&[
                    CostSample { round: 0, global_cost: 30 },
                    CostSample { round: 1, global_cost: 21 },
                ])
                .unwrap();
            logger.log(&CostSample { round: 2, global_cost: 19 }).unwrap();
        }
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(content, "round,global_cost\n0,30\n1,21\n2,19\n");
    }
}
