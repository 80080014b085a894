mod weight_readings;
