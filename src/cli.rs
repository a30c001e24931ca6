use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "tasky", version, about = "Track focused work sessions per project")]
pub struct Args {
    /// Directory holding the database, settings and log file
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Database file (defaults to <data-dir>/tasky.db)
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Countdown length in minutes, overriding settings.json
    #[arg(short, long, value_parser = parse_minutes)]
    pub minutes: Option<u32>,
}

impl Args {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tasky")
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.db
            .clone()
            .unwrap_or_else(|| self.data_dir().join("tasky.db"))
    }

    /// Session length in seconds when `--minutes` was given.
    pub fn duration_override(&self) -> Option<u32> {
        self.minutes.map(|m| m.saturating_mul(60))
    }
}

fn parse_minutes(value: &str) -> Result<u32, String> {
    let minutes: u32 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number of minutes"))?;
    if minutes == 0 {
        return Err("minutes must be greater than zero".into());
    }
    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_defaults_inside_data_dir() {
        let args = Args::try_parse_from(["tasky", "--data-dir", "/tmp/t"]).unwrap();
        assert_eq!(args.db_path(), PathBuf::from("/tmp/t/tasky.db"));
        assert_eq!(args.duration_override(), None);
    }

    #[test]
    fn minutes_override_duration() {
        let args = Args::try_parse_from(["tasky", "-m", "50", "--db", "x.db"]).unwrap();
        assert_eq!(args.duration_override(), Some(3000));
        assert_eq!(args.db_path(), PathBuf::from("x.db"));
    }

    #[test]
    fn zero_minutes_rejected() {
        assert!(Args::try_parse_from(["tasky", "--minutes", "0"]).is_err());
        assert!(Args::try_parse_from(["tasky", "--minutes", "soon"]).is_err());
    }
}
