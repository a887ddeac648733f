pub mod ontopo;
