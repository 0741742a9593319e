mod account;
mod play;
mod round;
