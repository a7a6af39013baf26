pub mod fixtures;

#[cfg(test)]
mod ticket_tests;
#[cfg(test)]
mod multi_tenancy_tests;
#[cfg(test)]
mod export_tests;
#[cfg(test)]
mod gateway_tests;
