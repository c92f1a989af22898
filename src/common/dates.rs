use chrono::{NaiveDate, NaiveDateTime};

use crate::common::error::AppError;

/// Aceita "2025-10-01" ou "2025-10-01T00:00:00".
pub fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(date_time.date());
    }
    Err(AppError::ValidationError(format!("Data inválida: {s}")))
}

pub fn parse_opt_date(s: &Option<String>) -> Result<Option<NaiveDate>, AppError> {
    s.as_deref().map(parse_date).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aceita_data_simples() {
        let date = parse_date("2025-10-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
    }

    #[test]
    fn aceita_data_com_horario() {
        let date = parse_date("2025-10-01T13:45:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
    }

    #[test]
    fn rejeita_data_malformada() {
        assert!(matches!(
            parse_date("01/10/2025"),
            Err(AppError::ValidationError(_))
        ));
        assert!(parse_date("").is_err());
    }

    #[test]
    fn ausente_vira_none() {
        assert_eq!(parse_opt_date(&None).unwrap(), None);
    }
}
