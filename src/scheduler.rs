// src/scheduler.rs

use crate::classify::classify;
use crate::day::DayBoundary;
use crate::error::FetchError;
use crate::source::OutageSource;
use crate::storage::SnapshotStore;
use crate::types::{Baseline, Classification, OutageSet};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

/// Relógio usado para decidir o dia do ciclo.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Estado do cache: nenhuma classificação ainda, ou a última calculada.
#[derive(Debug, Clone)]
enum CacheState {
    Empty,
    Populated(Arc<Classification>),
}

/// Estado que só é tocado dentro de um ciclo de coleta.
struct CycleState {
    baseline: OutageSet,
    policy: DayBoundary,
    /// Resultado do último ciclo concluído, repassado a quem esperou por ele.
    last_outcome: Option<Result<Arc<Classification>, FetchError>>,
}

/// Dono do baseline e do cache de classificação.
///
/// O mutex de `cycle` serializa os ciclos: quem o segura está buscando dados.
/// Virada de dia, gravação do snapshot e classificação acontecem todas com ele
/// preso, então nenhuma consulta vê um baseline pela metade.
pub struct OutageService {
    source: Arc<dyn OutageSource>,
    store: SnapshotStore,
    clock: Clock,
    cache: RwLock<CacheState>,
    cycle: Mutex<CycleState>,
    completed: AtomicU64,
}

impl OutageService {
    /// Monta o serviço a partir do baseline salvo (se houver).
    pub fn new(
        source: Arc<dyn OutageSource>,
        store: SnapshotStore,
        tz: Tz,
        saved: Option<Baseline>,
    ) -> Self {
        Self::with_clock(source, store, tz, saved, Arc::new(Utc::now))
    }

    pub fn with_clock(
        source: Arc<dyn OutageSource>,
        store: SnapshotStore,
        tz: Tz,
        saved: Option<Baseline>,
        clock: Clock,
    ) -> Self {
        let (baseline, last_reset) = match saved {
            Some(b) => (b.outages, Some(b.date)),
            None => (OutageSet::new(), None),
        };
        Self {
            source,
            store,
            clock,
            cache: RwLock::new(CacheState::Empty),
            cycle: Mutex::new(CycleState {
                baseline,
                policy: DayBoundary::new(tz, last_reset),
                last_outcome: None,
            }),
            completed: AtomicU64::new(0),
        }
    }

    /// Última classificação em cache, sem disparar coleta.
    pub fn cached(&self) -> Option<Arc<Classification>> {
        match &*self.cache.read().unwrap_or_else(|e| e.into_inner()) {
            CacheState::Empty => None,
            CacheState::Populated(c) => Some(Arc::clone(c)),
        }
    }

    /// Consulta do cliente.
    ///
    /// Com cache preenchido responde na hora. Com cache vazio espera o ciclo em
    /// andamento (e devolve o resultado dele, inclusive erro) ou dispara um.
    pub async fn query(&self) -> Result<Arc<Classification>, FetchError> {
        if let Some(c) = self.cached() {
            return Ok(c);
        }

        let seen = self.completed.load(Ordering::Acquire);
        let mut cycle = self.cycle.lock().await;

        if let Some(c) = self.cached() {
            return Ok(c);
        }
        if self.completed.load(Ordering::Acquire) != seen {
            if let Some(outcome) = &cycle.last_outcome {
                debug!("Consulta reaproveitando ciclo concluído durante a espera");
                return outcome.clone();
            }
        }

        info!("Cache vazio, buscando dados sob demanda");
        self.run_cycle(&mut cycle).await
    }

    /// Executa um ciclo completo (usado pelo timer).
    pub async fn refresh(&self) -> Result<Arc<Classification>, FetchError> {
        let mut cycle = self.cycle.lock().await;
        self.run_cycle(&mut cycle).await
    }

    async fn run_cycle(&self, cycle: &mut CycleState) -> Result<Arc<Classification>, FetchError> {
        let outcome = self.fetch_and_classify(cycle).await;
        cycle.last_outcome = Some(outcome.clone());
        self.completed.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    async fn fetch_and_classify(
        &self,
        cycle: &mut CycleState,
    ) -> Result<Arc<Classification>, FetchError> {
        let current = self.source.fetch().await?;
        let now = (self.clock)();

        if cycle.policy.should_rollover(now) {
            let date = cycle.policy.today(now);
            info!(
                "Novo dia ({}): baseline reiniciado com {} quedas",
                date,
                current.len()
            );
            cycle.baseline = current.clone();
            let snapshot = Baseline {
                outages: current.clone(),
                date,
            };
            if let Err(e) = self.store.save(&snapshot).await {
                error!(
                    "Erro ao gravar snapshot em {}: {}",
                    self.store.path().display(),
                    e
                );
            }
        }

        let classification = Arc::new(classify(&current, &cycle.baseline));
        info!(
            "Classificação atualizada: {} novas, {} encerradas, {} existentes",
            classification.added.len(),
            classification.ended.len(),
            classification.existing.len()
        );
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) =
            CacheState::Populated(Arc::clone(&classification));
        Ok(classification)
    }
}

/// Loop do timer: primeiro ciclo imediato, depois um a cada `period`.
///
/// Erros da API são logados e engolidos; o cache anterior continua servindo.
pub async fn run_scheduler(service: Arc<OutageService>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycle_number: u64 = 0;

    loop {
        ticker.tick().await;
        cycle_number += 1;
        let cycle_start = Instant::now();
        debug!("[CICLO {}] Iniciando coleta", cycle_number);

        match service.refresh().await {
            Ok(_) => info!(
                "[CICLO {}] Fim do ciclo. Duração: {:?}",
                cycle_number,
                cycle_start.elapsed()
            ),
            Err(e) => {
                if service.cached().is_some() {
                    warn!(
                        "[CICLO {}] Erro ao buscar dados da API: {}. Mantendo classificação anterior.",
                        cycle_number, e
                    );
                } else {
                    error!(
                        "[CICLO {}] Erro ao buscar dados da API: {}. Cache ainda vazio.",
                        cycle_number, e
                    );
                }
            }
        }
    }
}
