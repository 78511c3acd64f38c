mod polling;
mod session;
