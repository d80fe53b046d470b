//! Thread de trabalho para a conversão em segundo plano
//! No máximo uma conversão ativa por vez, sem bloquear a interface

use log::warn;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Dispara tarefas em uma thread dedicada, recusando execuções concorrentes
#[derive(Default)]
pub struct ConversionWorker {
    busy: Arc<AtomicBool>,
}

impl ConversionWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indica se há uma conversão em andamento
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Executa `task` em uma thread própria, se nenhuma outra estiver ativa
    ///
    /// Retorna `false` quando uma conversão anterior ainda não terminou. A
    /// thread não é aguardada; a flag de ocupado é limpa ao final da tarefa,
    /// inclusive se ela entrar em pânico.
    pub fn try_spawn(&self, task: impl FnOnce() + Send + 'static) -> bool {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Conversion already in progress; ignoring new request");
            return false;
        }

        let guard = BusyGuard {
            busy: Arc::clone(&self.busy),
        };
        let spawned = thread::Builder::new()
            .name("pdf-convert-worker".to_owned())
            .spawn(move || {
                let _reset = guard;
                task();
            });

        match spawned {
            // O handle é descartado: a thread roda desacoplada da interface
            Ok(_handle) => true,
            Err(e) => {
                // O closure nunca rodou; descartá-lo já limpou a flag
                warn!("Failed to spawn worker thread: {e}");
                false
            }
        }
    }
}

/// Limpa a flag de ocupado ao sair de escopo
struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn wait_until_idle(worker: &ConversionWorker) {
        for _ in 0..200 {
            if !worker.is_busy() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("worker never became idle");
    }

    #[test]
    fn runs_the_task() {
        let worker = ConversionWorker::new();
        let (tx, rx) = mpsc::channel();

        assert!(worker.try_spawn(move || tx.send(42).unwrap()));

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
        wait_until_idle(&worker);
    }

    #[test]
    fn refuses_second_task_while_busy() {
        let worker = ConversionWorker::new();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        assert!(worker.try_spawn(move || {
            release_rx.recv().ok();
        }));
        assert!(worker.is_busy());
        assert!(!worker.try_spawn(|| {}));

        release_tx.send(()).unwrap();
        wait_until_idle(&worker);

        assert!(worker.try_spawn(|| {}));
        wait_until_idle(&worker);
    }

    #[test]
    fn busy_flag_clears_even_if_the_task_panics() {
        let worker = ConversionWorker::new();

        assert!(worker.try_spawn(|| panic!("boom")));

        wait_until_idle(&worker);
        assert!(!worker.is_busy());
    }
}
