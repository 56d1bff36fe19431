pub mod car_game;
