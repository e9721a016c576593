use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Decide quando o baseline deve virar para o dia atual.
///
/// O "dia" é a data civil no fuso de referência do serviço. A virada acontece
/// no primeiro ciclo depois da meia-noite local, não num timer exato.
#[derive(Debug, Clone)]
pub struct DayBoundary {
    tz: Tz,
    last_reset: Option<NaiveDate>,
}

impl DayBoundary {
    pub fn new(tz: Tz, last_reset: Option<NaiveDate>) -> Self {
        Self { tz, last_reset }
    }

    /// Data civil de `now` no fuso de referência.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    pub fn last_reset(&self) -> Option<NaiveDate> {
        self.last_reset
    }

    /// Retorna true se `now` cai num dia diferente do último reset (ou se
    /// nunca houve reset) e já registra o novo dia. Não persiste nada.
    pub fn should_rollover(&mut self, now: DateTime<Utc>) -> bool {
        let today = self.today(now);
        if self.last_reset == Some(today) {
            return false;
        }
        self.last_reset = Some(today);
        true
    }
}
