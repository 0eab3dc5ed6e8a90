mod test_driver_loop;
mod test_negotiation;
