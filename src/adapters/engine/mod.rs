pub mod external_engine;
