use std::time::{Duration, Instant};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct StageTiming {
    pub name: String,
    pub duration: Duration,
}

/// Wall-clock time spent in each pipeline stage of one run
#[derive(Debug, Clone, Default)]
pub struct PipelineTimings {
    stages: Vec<StageTiming>,
    stage_map: HashMap<String, Duration>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stage(&mut self, name: impl Into<String>, duration: Duration) {
        let name = name.into();
        self.stages.push(StageTiming {
            name: name.clone(),
            duration,
        });
        *self.stage_map.entry(name).or_insert(Duration::ZERO) += duration;
    }

    /// Run `f`, recording its duration under `name`
    pub fn measure<T>(&mut self, name: &str, f: impl FnOnce() -> T) -> T {
        let timer = Timer::start(name);
        let value = f();
        let (name, duration) = timer.stop();
        self.add_stage(name, duration);
        value
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    pub fn get_stage(&self, name: &str) -> Option<Duration> {
        self.stage_map.get(name).copied()
    }

    pub fn stages(&self) -> &[StageTiming] {
        &self.stages
    }

    pub fn summary(&self) -> String {
        let total = self.total_duration();
        let mut out = String::from("Pipeline Timing Summary:\n");
        out.push_str(&format!("{:-<60}\n", ""));
        for stage in &self.stages {
            let percentage = if total.as_secs_f64() > 0.0 {
                (stage.duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            } else {
                0.0
            };
            out.push_str(&format!(
                "{:<30} {:>12.3}ms ({:>5.1}%)\n",
                stage.name,
                stage.duration.as_secs_f64() * 1000.0,
                percentage
            ));
        }
        out.push_str(&format!("{:-<60}\n", ""));
        out.push_str(&format!(
            "{:<30} {:>12.3}ms",
            "Total",
            total.as_secs_f64() * 1000.0
        ));
        out
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    pub fn stop(self) -> (String, Duration) {
        (self.name, self.start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_stage_accumulates() {
        let mut timings = PipelineTimings::new();
        timings.add_stage("classify", Duration::from_millis(3));
        timings.add_stage("classify", Duration::from_millis(2));
        timings.add_stage("render", Duration::from_millis(5));

        assert_eq!(timings.stages().len(), 3);
        assert_eq!(timings.get_stage("classify"), Some(Duration::from_millis(5)));
        assert_eq!(timings.total_duration(), Duration::from_millis(10));
        assert!(timings.summary().contains("render"));
    }

    #[test]
    fn test_measure_returns_value() {
        let mut timings = PipelineTimings::new();
        let value = timings.measure("sum", || (1..=4).sum::<u32>());
        assert_eq!(value, 10);
        assert!(timings.get_stage("sum").is_some());
    }
}
