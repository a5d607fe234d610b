pub mod d100_plan_fact;
