mod instrument_reconciler;

pub use instrument_reconciler::InstrumentReconciler;
