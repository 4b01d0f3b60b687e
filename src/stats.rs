//! Cache statistics: the five monotonic counters and their derived rates.

/// A sink a host can register named counters and formulas into, so a
/// `Cache` never has to depend on any particular statistics-registry crate.
pub trait StatSink {
    fn counter(&mut self, name: &str, value: u64);
    fn formula(&mut self, name: &str, value: f64);
}

/// The counters a `Cache` maintains across its lifetime. All fields are
/// monotonic non-decreasing for as long as the owning cache exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub replacements: u64,
    pub writebacks: u64,
    pub invalidations: u64,
}

impl CacheStats {
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn miss_rate(&self) -> f64 {
        ratio(self.misses, self.accesses())
    }

    pub fn repl_rate(&self) -> f64 {
        ratio(self.replacements, self.accesses())
    }

    pub fn wb_rate(&self) -> f64 {
        ratio(self.writebacks, self.accesses())
    }

    pub fn inv_rate(&self) -> f64 {
        ratio(self.invalidations, self.accesses())
    }

    /// Registers every counter and derived rate under `<name>.` into `sink`,
    /// mirroring how the original registered each cache's stats by prefixing
    /// its configured name onto a fixed set of metric suffixes.
    pub fn register_into(&self, name: &str, sink: &mut impl StatSink) {
        sink.formula(&format!("{name}.accesses"), self.accesses() as f64);
        sink.counter(&format!("{name}.hits"), self.hits);
        sink.counter(&format!("{name}.misses"), self.misses);
        sink.counter(&format!("{name}.replacements"), self.replacements);
        sink.counter(&format!("{name}.writebacks"), self.writebacks);
        sink.counter(&format!("{name}.invalidations"), self.invalidations);
        sink.formula(&format!("{name}.miss_rate"), self.miss_rate());
        sink.formula(&format!("{name}.repl_rate"), self.repl_rate());
        sink.formula(&format!("{name}.wb_rate"), self.wb_rate());
        sink.formula(&format!("{name}.inv_rate"), self.inv_rate());
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
