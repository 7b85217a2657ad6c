mod setup;

mod bios_hle;
mod cpu;
mod dma;
mod frame;
