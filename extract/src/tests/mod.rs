mod circuits;
mod index;
mod scenarios;
